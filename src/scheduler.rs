use crate::calendar::add_weeks;
use crate::config::ForecastConfig;
use crate::period::{Granularity, PeriodKey, WeekYear};
use crate::schema::Deal;
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// One expected incoming payment derived from a won deal.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentEvent {
    pub due: NaiveDate,
    pub amount: f64,
}

/// Maps won deals to the two payments they generate.
///
/// The first share of the value is due `lag` weeks after the won date, the
/// remainder `lag` weeks after the event date.
#[derive(Debug, Clone)]
pub struct PaymentScheduler {
    lag_weeks: u32,
    first_share: f64,
    week_year: WeekYear,
}

impl PaymentScheduler {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            lag_weeks: config.payment_lag_weeks,
            first_share: config.first_payment_share,
            week_year: config.week_year,
        }
    }

    /// Returns `None` when the deal does not qualify for the cash-flow forecast.
    pub fn payments(&self, deal: &Deal) -> Option<[PaymentEvent; 2]> {
        if !deal.is_won() {
            return None;
        }

        if !deal.value.is_finite() || deal.value <= 0.0 {
            debug!("Skipping won deal with unusable value {}", deal.value);
            return None;
        }

        let (won_date, event_date) = match (deal.won_date, deal.event_date) {
            (Some(won), Some(event)) => (won, event),
            _ => {
                debug!(
                    "Skipping won deal worth {} without won date or event date",
                    deal.value
                );
                return None;
            }
        };

        let (first_due, second_due) = match (
            add_weeks(won_date, self.lag_weeks),
            add_weeks(event_date, self.lag_weeks),
        ) {
            (Some(first), Some(second)) => (first, second),
            _ => {
                debug!(
                    "Skipping won deal with out-of-range dates {} / {}",
                    won_date, event_date
                );
                return None;
            }
        };

        let first_amount = deal.value * self.first_share;
        Some([
            PaymentEvent {
                due: first_due,
                amount: first_amount,
            },
            PaymentEvent {
                due: second_due,
                amount: deal.value - first_amount,
            },
        ])
    }

    /// Sums the payments of all qualifying deals per period.
    pub fn schedule(&self, deals: &[Deal], granularity: Granularity) -> BTreeMap<PeriodKey, f64> {
        let mut buckets: BTreeMap<PeriodKey, f64> = BTreeMap::new();
        let mut scheduled = 0usize;

        for deal in deals {
            let Some(payments) = self.payments(deal) else {
                continue;
            };
            scheduled += 1;

            for payment in payments {
                let key = granularity.key_for(payment.due, self.week_year);
                *buckets.entry(key).or_insert(0.0) += payment.amount;
            }
        }

        debug!(
            "Scheduled payments for {} of {} deals into {} {:?} buckets",
            scheduled,
            deals.len(),
            buckets.len(),
            granularity
        );

        buckets
    }
}
