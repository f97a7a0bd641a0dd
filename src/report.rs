use crate::engine::ForecastEngine;
use crate::error::{ForecastError, Result};
use crate::ingestion::{parse_deals_csv, DealTable};
use crate::schema::{DealStat, MonthlyForecast, WeeklyForecast};
use crate::store::{load_or_empty, AdjustmentSource};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shape of the uploaded export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub columns: usize,
    pub rows: usize,
    pub won_deals_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub total_rows: usize,
    pub won_deals: usize,
    pub total_deal_value: f64,
    pub headers: Vec<String>,
    pub sample_data: Vec<BTreeMap<String, String>>,
    pub liquidity_forecast: MonthlyForecast,
    pub monthly_deal_stats: Vec<DealStat>,
    pub summary: UploadSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub won_deals: usize,
    pub total_deal_value: f64,
    pub liquidity_forecast: WeeklyForecast,
    pub weekly_deal_stats: Vec<DealStat>,
}

fn require_csv(engine: &ForecastEngine, csv: Option<&str>) -> Result<DealTable> {
    let text = csv
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ForecastError::MissingInput("No CSV file provided".to_string()))?;
    parse_deals_csv(text, engine.config())
}

impl ForecastEngine {
    /// Monthly forecast and statistics for one uploaded export.
    pub fn monthly_report(&self, csv: Option<&str>) -> Result<MonthlyReport> {
        let table = require_csv(self, csv)?;
        let won = table.won_deals();

        info!(
            "Building monthly report: {} rows, {} won deals",
            table.total_rows(),
            won.len()
        );

        Ok(MonthlyReport {
            total_rows: table.total_rows(),
            won_deals: won.len(),
            total_deal_value: table.total_won_value(),
            liquidity_forecast: self.compute_monthly_forecast(&won),
            monthly_deal_stats: self.compute_monthly_deal_stats(&table.deals),
            summary: UploadSummary {
                columns: table.headers.len(),
                rows: table.total_rows(),
                won_deals_count: won.len(),
                timestamp: Utc::now(),
            },
            headers: table.headers,
            sample_data: table.sample_rows,
        })
    }

    /// Weekly forecast and statistics; adjustments that fail to load are left out.
    pub fn weekly_report(
        &self,
        csv: Option<&str>,
        adjustments: &dyn AdjustmentSource,
    ) -> Result<WeeklyReport> {
        let table = require_csv(self, csv)?;
        let won = table.won_deals();
        let adjustments = load_or_empty(adjustments);

        info!(
            "Building weekly report: {} rows, {} won deals, {} adjustments",
            table.total_rows(),
            won.len(),
            adjustments.len()
        );

        Ok(WeeklyReport {
            won_deals: won.len(),
            total_deal_value: table.total_won_value(),
            liquidity_forecast: self.compute_weekly_forecast(&won, &adjustments),
            weekly_deal_stats: self.compute_weekly_deal_stats(&table.deals),
        })
    }
}
