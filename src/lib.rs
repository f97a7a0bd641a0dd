//! # Deal Liquidity Forecast
//!
//! A library for turning a CRM export of sales deals into a cash-flow
//! forecast, bucketed by ISO week or calendar month.
//!
//! ## Core Concepts
//!
//! - **Payment schedule**: every won deal pays half its value three weeks after
//!   it was won and the other half three weeks after its event date
//! - **Revenue adjustments**: manually entered monthly figures. Partnership
//!   income is booked on the last week of its month, prior-year revenue is
//!   weighted and spread flat over every week touching the month
//! - **Cumulative balance**: running total over the current and future periods,
//!   computed chronologically even though output is newest first
//! - **Deal statistics**: won/lost counts, values and win rate per period
//!
//! ## Example
//!
//! ```rust,ignore
//! use deal_liquidity_forecast::*;
//! use chrono::NaiveDate;
//!
//! let deals = vec![Deal::won(
//!     1000.0,
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//! )];
//! let adjustments = vec![RevenueAdjustment::partnership(2024, 3, 500.0)];
//!
//! let engine = ForecastEngine::default()
//!     .with_today(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//! let weekly = engine.compute_weekly_forecast(&deals, &adjustments);
//! println!("{}", weekly.summary.formatted_final_balance);
//! ```

pub mod adjustments;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod ingestion;
pub mod period;
pub mod report;
pub mod scheduler;
pub mod schema;
pub mod stats;
pub mod store;

pub use adjustments::{AdjustmentBuckets, RevenueDistributor};
pub use calendar::*;
pub use config::{CsvColumns, ForecastConfig, StatusLabels};
pub use engine::{accumulate, newest_first, ForecastEngine, LedgerRow, PeriodAmounts};
pub use error::{ForecastError, Result};
pub use format::{CurrencyFormatter, EuroFormatter, PlainFormatter};
pub use ingestion::{parse_deals_csv, read_deals_csv, DealTable};
pub use period::{Granularity, Period, PeriodKey, WeekYear};
pub use report::{MonthlyReport, UploadSummary, WeeklyReport};
pub use scheduler::{PaymentEvent, PaymentScheduler};
pub use schema::*;
pub use stats::win_rate;
pub use store::{load_or_empty, AdjustmentSource, InMemoryAdjustments, JsonFileStore};

/// Monthly forecast with the default configuration, relative to today.
pub fn compute_monthly_forecast(deals: &[Deal]) -> MonthlyForecast {
    ForecastEngine::default().compute_monthly_forecast(deals)
}

/// Weekly forecast with the default configuration, relative to today.
pub fn compute_weekly_forecast(
    won_deals: &[Deal],
    adjustments: &[RevenueAdjustment],
) -> WeeklyForecast {
    ForecastEngine::default().compute_weekly_forecast(won_deals, adjustments)
}

pub fn compute_monthly_deal_stats(all_deals: &[Deal]) -> Vec<DealStat> {
    ForecastEngine::default().compute_monthly_deal_stats(all_deals)
}

pub fn compute_weekly_deal_stats(all_deals: &[Deal]) -> Vec<DealStat> {
    ForecastEngine::default().compute_weekly_deal_stats(all_deals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate};

    #[test]
    fn test_free_functions_never_return_past_periods() {
        let today = Local::now().date_naive();
        let long_ago = NaiveDate::from_ymd_opt(2001, 5, 1).unwrap();
        let deals = vec![
            Deal::won(1000.0, long_ago, long_ago),
            Deal::won(500.0, today, today),
        ];

        let weekly = compute_weekly_forecast(&deals, &[]);
        let current_week = week_key(today, WeekYear::Iso);
        assert!(weekly.weekly_forecast.iter().all(|e| e.period.key() >= &current_week));
        assert_eq!(weekly.summary.final_balance, 500.0);

        let monthly = compute_monthly_forecast(&deals);
        let current_month = month_key(today);
        assert!(monthly
            .monthly_forecast
            .iter()
            .all(|e| e.period.key() >= &current_month));
        assert_eq!(monthly.summary.final_balance, 500.0);
    }

    #[test]
    fn test_free_function_stats_keep_history() {
        let long_ago = NaiveDate::from_ymd_opt(2001, 5, 1).unwrap();
        let deals = vec![Deal::won(1000.0, long_ago, long_ago), Deal::lost(10.0, long_ago)];

        let monthly = compute_monthly_deal_stats(&deals);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].period, "2001-05");

        let weekly = compute_weekly_deal_stats(&deals);
        assert_eq!(weekly[0].win_rate, 50);
    }
}
