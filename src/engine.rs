use crate::adjustments::{AdjustmentBuckets, RevenueDistributor};
use crate::calendar::{month_key, week_key};
use crate::config::ForecastConfig;
use crate::error::Result;
use crate::format::{CurrencyFormatter, EuroFormatter};
use crate::period::{Granularity, Period, PeriodKey};
use crate::scheduler::PaymentScheduler;
use crate::schema::{
    Deal, DealStat, ForecastComponents, ForecastEntry, MonthlyForecast, MonthlySummary,
    RevenueAdjustment, WeeklyForecast, WeeklySummary,
};
use crate::stats::deal_stats;
use chrono::{Local, NaiveDate};
use log::{debug, info};
use std::collections::BTreeMap;

/// Raw per-source amounts collected for one period before rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodAmounts {
    pub deal: f64,
    pub partnership: f64,
    pub prior_year: f64,
}

impl PeriodAmounts {
    pub fn total(&self) -> f64 {
        self.deal + self.partnership + self.prior_year
    }

    fn rounded(&self) -> Self {
        Self {
            deal: round2(self.deal),
            partnership: round2(self.partnership),
            prior_year: round2(self.prior_year),
        }
    }
}

/// A period with its rounded amounts and the balance carried up to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub period: PeriodKey,
    pub amount: f64,
    pub components: PeriodAmounts,
    pub cumulative_balance: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Combines the deal schedule with the adjustment buckets into one map of periods.
pub fn merge_sources(
    deals: &BTreeMap<PeriodKey, f64>,
    adjustments: &AdjustmentBuckets,
) -> BTreeMap<PeriodKey, PeriodAmounts> {
    let mut merged: BTreeMap<PeriodKey, PeriodAmounts> = BTreeMap::new();

    for (key, amount) in deals {
        merged.entry(key.clone()).or_default().deal += amount;
    }
    for (key, amount) in &adjustments.partnership {
        merged.entry(key.clone()).or_default().partnership += amount;
    }
    for (key, amount) in &adjustments.prior_year {
        merged.entry(key.clone()).or_default().prior_year += amount;
    }

    merged
}

/// Drops every period that sorts before `current`.
pub fn retain_from(
    mut periods: BTreeMap<PeriodKey, PeriodAmounts>,
    current: &PeriodKey,
) -> BTreeMap<PeriodKey, PeriodAmounts> {
    periods.split_off(current)
}

/// First transformation: walks the periods in ascending order and attaches the running balance.
///
/// The balance accumulates the rounded period amounts, so each row satisfies
/// `balance[i] == balance[i - 1] + amount[i]` up to the final rounding.
pub fn accumulate(periods: BTreeMap<PeriodKey, PeriodAmounts>) -> Vec<LedgerRow> {
    let mut running = 0.0;

    periods
        .into_iter()
        .map(|(period, raw)| {
            let amount = round2(raw.total());
            running += amount;
            LedgerRow {
                period,
                amount,
                components: raw.rounded(),
                cumulative_balance: round2(running),
            }
        })
        .collect()
}

/// Second transformation: display order, newest period first. Balances are left untouched.
pub fn newest_first(mut rows: Vec<LedgerRow>) -> Vec<LedgerRow> {
    rows.sort_by(|a, b| b.period.cmp(&a.period));
    rows
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LedgerTotals {
    periods: usize,
    total: f64,
    average: f64,
    final_balance: f64,
}

impl LedgerTotals {
    fn of(ascending: &[LedgerRow]) -> Self {
        let total: f64 = ascending.iter().map(|row| row.amount).sum();
        let average = if ascending.is_empty() {
            0.0
        } else {
            round2(total / ascending.len() as f64)
        };

        Self {
            periods: ascending.len(),
            total: round2(total),
            average,
            final_balance: ascending
                .last()
                .map(|row| row.cumulative_balance)
                .unwrap_or(0.0),
        }
    }
}

/// Turns deal exports and revenue adjustments into liquidity forecasts and deal statistics.
///
/// The engine is immutable once built; every call recomputes from its inputs.
pub struct ForecastEngine {
    config: ForecastConfig,
    scheduler: PaymentScheduler,
    distributor: RevenueDistributor,
    formatter: Box<dyn CurrencyFormatter>,
    today: Option<NaiveDate>,
}

impl ForecastEngine {
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ForecastConfig) -> Self {
        Self {
            scheduler: PaymentScheduler::new(&config),
            distributor: RevenueDistributor::new(&config),
            formatter: Box::new(EuroFormatter),
            today: None,
            config,
        }
    }

    pub fn with_formatter(mut self, formatter: impl CurrencyFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Pins the reference date used to drop past periods. Defaults to the local date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn current_period(&self, granularity: Granularity) -> PeriodKey {
        match granularity {
            Granularity::Week => week_key(self.today(), self.config.week_year),
            Granularity::Month => month_key(self.today()),
        }
    }

    /// Monthly cash flow from won deals only. Revenue adjustments are not applied to this view.
    pub fn compute_monthly_forecast(&self, deals: &[Deal]) -> MonthlyForecast {
        info!("Computing monthly forecast for {} deals", deals.len());

        let schedule = self.scheduler.schedule(deals, Granularity::Month);
        let rows = self.ledger(
            merge_sources(&schedule, &AdjustmentBuckets::default()),
            Granularity::Month,
        );

        let totals = LedgerTotals::of(&rows);

        MonthlyForecast {
            total_forecast_amount: totals.total,
            summary: MonthlySummary {
                total_months: totals.periods,
                average_monthly_amount: totals.average,
                final_balance: totals.final_balance,
                formatted_final_balance: self.formatter.format(totals.final_balance),
            },
            monthly_forecast: self.render(newest_first(rows), false),
        }
    }

    /// Weekly cash flow from won deals plus partnership and prior-year revenue.
    pub fn compute_weekly_forecast(
        &self,
        won_deals: &[Deal],
        adjustments: &[RevenueAdjustment],
    ) -> WeeklyForecast {
        info!(
            "Computing weekly forecast for {} deals and {} revenue adjustments",
            won_deals.len(),
            adjustments.len()
        );

        let schedule = self.scheduler.schedule(won_deals, Granularity::Week);
        let buckets = self.distributor.distribute(adjustments);
        let rows = self.ledger(merge_sources(&schedule, &buckets), Granularity::Week);

        let totals = LedgerTotals::of(&rows);

        WeeklyForecast {
            summary: WeeklySummary {
                total_weeks: totals.periods,
                final_balance: totals.final_balance,
                formatted_final_balance: self.formatter.format(totals.final_balance),
            },
            weekly_forecast: self.render(newest_first(rows), true),
        }
    }

    pub fn compute_monthly_deal_stats(&self, all_deals: &[Deal]) -> Vec<DealStat> {
        deal_stats(all_deals, Granularity::Month, self.config.week_year)
    }

    pub fn compute_weekly_deal_stats(&self, all_deals: &[Deal]) -> Vec<DealStat> {
        deal_stats(all_deals, Granularity::Week, self.config.week_year)
    }

    fn ledger(
        &self,
        periods: BTreeMap<PeriodKey, PeriodAmounts>,
        granularity: Granularity,
    ) -> Vec<LedgerRow> {
        let current = self.current_period(granularity);
        let total_periods = periods.len();
        let retained = retain_from(periods, &current);

        debug!(
            "Keeping {} of {} {:?} periods from {} onwards",
            retained.len(),
            total_periods,
            granularity,
            current
        );

        accumulate(retained)
    }

    fn render(&self, rows: Vec<LedgerRow>, with_components: bool) -> Vec<ForecastEntry> {
        rows.into_iter()
            .map(|row| {
                let components = with_components.then(|| ForecastComponents {
                    deal_amount: row.components.deal,
                    formatted_deal_amount: self.formatter.format(row.components.deal),
                    partnership: row.components.partnership,
                    formatted_partnership: self.formatter.format(row.components.partnership),
                    prior_year: row.components.prior_year,
                    formatted_prior_year: self.formatter.format(row.components.prior_year),
                });

                ForecastEntry {
                    formatted_amount: self.formatter.format(row.amount),
                    formatted_cumulative_balance: self.formatter.format(row.cumulative_balance),
                    period: Period::from(row.period),
                    amount: row.amount,
                    components,
                    cumulative_balance: row.cumulative_balance,
                }
            })
            .collect()
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::from_valid_config(ForecastConfig::default())
    }
}
