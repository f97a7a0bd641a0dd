use crate::error::{ForecastError, Result};
use crate::period::Period;
use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Won,
    Lost,
    #[schemars(description = "Any other status label from the export (open, deleted, ...)")]
    Other(String),
}

/// A deal as read from the CRM export.
///
/// Dates that were missing or could not be parsed are `None`; the computations
/// that need them skip the deal instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub value: f64,
    pub status: DealStatus,
    #[serde(default)]
    pub won_date: Option<NaiveDate>,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub lost_date: Option<NaiveDate>,
}

impl Deal {
    pub fn won(value: f64, won_date: NaiveDate, event_date: NaiveDate) -> Self {
        Self {
            value,
            status: DealStatus::Won,
            won_date: Some(won_date),
            event_date: Some(event_date),
            lost_date: None,
        }
    }

    pub fn lost(value: f64, lost_date: NaiveDate) -> Self {
        Self {
            value,
            status: DealStatus::Lost,
            won_date: None,
            event_date: None,
            lost_date: Some(lost_date),
        }
    }

    pub fn is_won(&self) -> bool {
        self.status == DealStatus::Won
    }

    /// The date the deal was decided: won-date for won deals, lost-date for lost ones.
    pub fn resolution_date(&self) -> Option<NaiveDate> {
        match self.status {
            DealStatus::Won => self.won_date,
            DealStatus::Lost => self.lost_date,
            DealStatus::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AdjustmentKind {
    #[serde(rename = "partnerschaften", alias = "partnership")]
    #[schemars(description = "Fixed monthly partnership income, booked in full in the last week of the month")]
    Partnership,

    #[serde(rename = "previous_revenue", alias = "prior-year", alias = "prior_year")]
    #[schemars(
        description = "Revenue estimate from the same month last year, weighted and spread over every week touching the month"
    )]
    PriorYear,
}

/// A manually entered monthly revenue figure blended into the weekly forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueAdjustment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub kind: AdjustmentKind,

    pub year: i32,

    #[schemars(description = "Calendar month, 1 = January")]
    pub month: u32,

    pub amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Prior-year entries only: confidence weight in [0, 1], defaults to 1")]
    pub weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RevenueAdjustment {
    pub fn partnership(year: i32, month: u32, amount: f64) -> Self {
        Self {
            id: None,
            kind: AdjustmentKind::Partnership,
            year,
            month,
            amount,
            weight: None,
            created_at: None,
        }
    }

    pub fn prior_year(year: i32, month: u32, amount: f64, weight: Option<f64>) -> Self {
        Self {
            id: None,
            kind: AdjustmentKind::PriorYear,
            year,
            month,
            amount,
            weight,
            created_at: None,
        }
    }

    /// Partnerships always count in full; prior-year entries default to weight 1.
    pub fn effective_weight(&self) -> f64 {
        match self.kind {
            AdjustmentKind::Partnership => 1.0,
            AdjustmentKind::PriorYear => self.weight.unwrap_or(1.0),
        }
    }

    pub fn weighted_amount(&self) -> f64 {
        self.amount * self.effective_weight()
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(ForecastError::InvalidMonth {
                year: self.year,
                month: self.month,
            });
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ForecastError::InvalidAdjustment(format!(
                "amount {} must be a positive number",
                self.amount
            )));
        }

        if self.kind == AdjustmentKind::PriorYear {
            if let Some(weight) = self.weight {
                if !(0.0..=1.0).contains(&weight) {
                    return Err(ForecastError::InvalidAdjustment(format!(
                        "weight {} must be between 0.0 and 1.0",
                        weight
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(RevenueAdjustment);
        serde_json::to_string_pretty(&schema)
    }
}

/// Per-source breakdown of a weekly forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastComponents {
    pub deal_amount: f64,
    pub formatted_deal_amount: String,
    #[serde(rename = "partnerschaften")]
    pub partnership: f64,
    #[serde(rename = "formattedPartnerschaften")]
    pub formatted_partnership: String,
    #[serde(rename = "previousRevenue")]
    pub prior_year: f64,
    #[serde(rename = "formattedPreviousRevenue")]
    pub formatted_prior_year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    #[serde(flatten)]
    pub period: Period,
    pub amount: f64,
    pub formatted_amount: String,
    #[serde(flatten)]
    pub components: Option<ForecastComponents>,
    /// Running total of `amount` over all retained periods up to and including this one.
    pub cumulative_balance: f64,
    pub formatted_cumulative_balance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub total_weeks: usize,
    pub final_balance: f64,
    pub formatted_final_balance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub total_months: usize,
    /// Mean of the rounded monthly amounts, 0 without any month.
    pub average_monthly_amount: f64,
    pub final_balance: f64,
    pub formatted_final_balance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyForecast {
    pub monthly_forecast: Vec<ForecastEntry>,
    pub total_forecast_amount: f64,
    pub summary: MonthlySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyForecast {
    pub weekly_forecast: Vec<ForecastEntry>,
    pub summary: WeeklySummary,
}

/// Won/lost counts and values for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealStat {
    #[serde(flatten)]
    pub period: Period,
    pub total_deals: u32,
    pub won_deals: u32,
    pub lost_deals: u32,
    pub total_value: f64,
    pub won_value: f64,
    pub lost_value: f64,
    /// Integer percentage, 0 when the period has no deals.
    pub win_rate: u32,
}
