use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::schema::{Deal, DealStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Raw rows kept for previewing an upload.
pub const SAMPLE_ROWS: usize = 5;

/// All rows of a deal export, converted to [`Deal`]s in file order.
#[derive(Debug, Clone, Default)]
pub struct DealTable {
    pub headers: Vec<String>,
    pub deals: Vec<Deal>,
    /// The first [`SAMPLE_ROWS`] rows as header-keyed cells, unconverted.
    pub sample_rows: Vec<BTreeMap<String, String>>,
}

impl DealTable {
    pub fn total_rows(&self) -> usize {
        self.deals.len()
    }

    pub fn won_deals(&self) -> Vec<Deal> {
        self.deals.iter().filter(|d| d.is_won()).cloned().collect()
    }

    /// Sum over every won deal, including those the forecast later skips for missing dates.
    pub fn total_won_value(&self) -> f64 {
        self.deals
            .iter()
            .filter(|d| d.is_won())
            .map(|d| d.value)
            .sum()
    }
}

pub fn parse_deals_csv(text: &str, config: &ForecastConfig) -> Result<DealTable> {
    if text.trim().is_empty() {
        return Err(ForecastError::MissingInput("CSV export is empty".to_string()));
    }
    read_deals_csv(text.as_bytes(), config)
}

pub fn read_deals_csv<R: Read>(reader: R, config: &ForecastConfig) -> Result<DealTable> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(clean_cell)
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(ForecastError::MissingInput("CSV export has no header row".to_string()));
    }

    let mut deals = Vec::new();
    let mut sample_rows: Vec<BTreeMap<String, String>> = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|cell| clean_cell(cell).is_empty()) {
            continue;
        }

        let row = keyed_row(&headers, &record);
        if sample_rows.len() < SAMPLE_ROWS {
            sample_rows.push(
                row.iter()
                    .map(|(header, cell)| (header.to_string(), cell.to_string()))
                    .collect(),
            );
        }
        deals.push(row_to_deal(&row, config));
    }

    debug!("Parsed {} deal rows with {} columns", deals.len(), headers.len());

    Ok(DealTable {
        headers,
        deals,
        sample_rows,
    })
}

fn keyed_row<'a>(headers: &'a [String], record: &'a StringRecord) -> HashMap<&'a str, &'a str> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (header.as_str(), record.get(idx).map(clean_cell).unwrap_or("")))
        .collect()
}

fn clean_cell(cell: &str) -> &str {
    cell.trim().trim_matches('"').trim()
}

fn row_to_deal(row: &HashMap<&str, &str>, config: &ForecastConfig) -> Deal {
    let columns = &config.columns;
    let cell = |name: &str| row.get(name).copied().unwrap_or("");

    let status_label = cell(columns.status.as_str());
    let status = if status_label == config.status_labels.won {
        DealStatus::Won
    } else if status_label == config.status_labels.lost {
        DealStatus::Lost
    } else {
        DealStatus::Other(status_label.to_string())
    };

    Deal {
        value: parse_value(cell(columns.value.as_str())),
        status,
        won_date: parse_date(cell(columns.won_date.as_str())),
        event_date: parse_date(cell(columns.event_date.as_str())),
        lost_date: parse_date(cell(columns.lost_date.as_str())),
    }
}

/// Empty or unparseable values count as zero.
pub fn parse_value(raw: &str) -> f64 {
    if raw.is_empty() {
        return 0.0;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            warn!("Unparseable deal value '{}', treating as 0", raw);
            0.0
        }
    }
}

/// Accepts plain dates, naive date-times and RFC 3339 timestamps; only the date part is kept.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }

    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()));

    if parsed.is_none() {
        warn!("Invalid date found: '{}'", raw);
    }
    parsed
}
