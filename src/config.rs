use crate::error::{ForecastError, Result};
use crate::period::WeekYear;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Header names of the deal CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CsvColumns {
    pub value: String,
    pub status: String,
    pub won_date: String,
    pub event_date: String,
    pub lost_date: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            value: "Deal - Wert".to_string(),
            status: "Deal - Status".to_string(),
            won_date: "Deal - Datum des gewonnenen Deals".to_string(),
            event_date: "Deal - Event Datum".to_string(),
            lost_date: "Deal - Datum des verlorenen Deals".to_string(),
        }
    }
}

/// Status cell values that mark a deal as won or lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StatusLabels {
    pub won: String,
    pub lost: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            won: "Gewonnen".to_string(),
            lost: "Verloren".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ForecastConfig {
    #[schemars(description = "Weeks between a deal date (won or event) and the matching payment")]
    pub payment_lag_weeks: u32,

    #[schemars(
        description = "Share of the deal value paid after the won date. The rest is paid after the event date."
    )]
    pub first_payment_share: f64,

    #[schemars(description = "Average weeks per month used to spread prior-year revenue")]
    pub weeks_per_month: f64,

    #[schemars(description = "Year used to label week keys")]
    pub week_year: WeekYear,

    pub columns: CsvColumns,

    pub status_labels: StatusLabels,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            payment_lag_weeks: 3,
            first_payment_share: 0.5,
            weeks_per_month: 4.33,
            week_year: WeekYear::Iso,
            columns: CsvColumns::default(),
            status_labels: StatusLabels::default(),
        }
    }
}

impl ForecastConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ForecastConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.first_payment_share) {
            return Err(ForecastError::InvalidConfig(format!(
                "first_payment_share {} must be between 0.0 and 1.0",
                self.first_payment_share
            )));
        }

        if !self.weeks_per_month.is_finite() || self.weeks_per_month <= 0.0 {
            return Err(ForecastError::InvalidConfig(format!(
                "weeks_per_month {} must be a positive number",
                self.weeks_per_month
            )));
        }

        Ok(())
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(ForecastConfig);
        serde_json::to_string_pretty(&schema)
    }
}
