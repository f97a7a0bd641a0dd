use crate::calendar::{last_week_of_month, validate_month, weeks_in_month};
use crate::config::ForecastConfig;
use crate::period::{PeriodKey, WeekYear};
use crate::schema::{AdjustmentKind, RevenueAdjustment};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Weekly contributions of the manual revenue entries, kept apart per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentBuckets {
    pub partnership: BTreeMap<PeriodKey, f64>,
    pub prior_year: BTreeMap<PeriodKey, f64>,
}

impl AdjustmentBuckets {
    pub fn is_empty(&self) -> bool {
        self.partnership.is_empty() && self.prior_year.is_empty()
    }
}

/// Spreads monthly revenue adjustments onto week keys.
#[derive(Debug, Clone)]
pub struct RevenueDistributor {
    weeks_per_month: f64,
    week_year: WeekYear,
}

impl RevenueDistributor {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            weeks_per_month: config.weeks_per_month,
            week_year: config.week_year,
        }
    }

    pub fn distribute(&self, adjustments: &[RevenueAdjustment]) -> AdjustmentBuckets {
        let (partnerships, prior_year): (Vec<&RevenueAdjustment>, Vec<&RevenueAdjustment>) =
            adjustments
                .iter()
                .partition(|adj| adj.kind == AdjustmentKind::Partnership);

        AdjustmentBuckets {
            partnership: self.distribute_partnerships(&partnerships),
            prior_year: self.distribute_prior_year(&prior_year),
        }
    }

    /// Each partnership amount lands in full on the week holding the month's last day.
    fn distribute_partnerships(&self, entries: &[&RevenueAdjustment]) -> BTreeMap<PeriodKey, f64> {
        let mut buckets = BTreeMap::new();

        for adj in entries {
            match last_week_of_month(adj.year, adj.month, self.week_year) {
                Ok(week) => {
                    debug!(
                        "Partnership {} for {:04}-{:02} booked on {}",
                        adj.amount, adj.year, adj.month, week
                    );
                    *buckets.entry(week).or_insert(0.0) += adj.amount;
                }
                Err(e) => warn!("Skipping partnership adjustment: {}", e),
            }
        }

        buckets
    }

    /// Weighted monthly totals, divided by the average week count and added
    /// unchanged to every week that touches the month.
    fn distribute_prior_year(&self, entries: &[&RevenueAdjustment]) -> BTreeMap<PeriodKey, f64> {
        let mut monthly_totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();

        for adj in entries {
            if let Err(e) = validate_month(adj.year, adj.month) {
                warn!("Skipping prior-year adjustment: {}", e);
                continue;
            }
            *monthly_totals.entry((adj.year, adj.month)).or_insert(0.0) += adj.weighted_amount();
        }

        let mut buckets = BTreeMap::new();

        for ((year, month), total) in monthly_totals {
            let weekly_amount = total / self.weeks_per_month;
            let weeks = match weeks_in_month(year, month, self.week_year) {
                Ok(weeks) => weeks,
                Err(e) => {
                    warn!("Skipping prior-year adjustment: {}", e);
                    continue;
                }
            };

            debug!(
                "Prior-year revenue {:04}-{:02}: {:.2} weighted, {:.2} per week over {} weeks",
                year,
                month,
                total,
                weekly_amount,
                weeks.len()
            );

            for week in weeks {
                *buckets.entry(week).or_insert(0.0) += weekly_amount;
            }
        }

        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distributor() -> RevenueDistributor {
        RevenueDistributor::new(&ForecastConfig::default())
    }

    #[test]
    fn test_partnership_goes_to_last_week_only() {
        let buckets = distributor().distribute(&[RevenueAdjustment::partnership(2024, 3, 500.0)]);

        assert!(buckets.prior_year.is_empty());
        assert_eq!(buckets.partnership.len(), 1);
        assert_eq!(buckets.partnership.get(&PeriodKey::week(2024, 13)), Some(&500.0));
        for week in 9..13 {
            assert!(!buckets.partnership.contains_key(&PeriodKey::week(2024, week)));
        }
    }

    #[test]
    fn test_partnerships_in_same_month_add_up() {
        let buckets = distributor().distribute(&[
            RevenueAdjustment::partnership(2024, 3, 500.0),
            RevenueAdjustment::partnership(2024, 3, 250.0),
        ]);
        assert_eq!(buckets.partnership.get(&PeriodKey::week(2024, 13)), Some(&750.0));
    }

    #[test]
    fn test_prior_year_spreads_flat_across_touched_weeks() {
        let buckets =
            distributor().distribute(&[RevenueAdjustment::prior_year(2024, 6, 1000.0, Some(0.5))]);

        assert!(buckets.partnership.is_empty());
        assert_eq!(buckets.prior_year.len(), 5);
        let expected = 1000.0 * 0.5 / 4.33;
        for week in 22..=26 {
            let amount = buckets.prior_year[&PeriodKey::week(2024, week)];
            assert!((amount - expected).abs() < 1e-9);
            assert!((amount - 115.47).abs() < 0.005);
        }
    }

    #[test]
    fn test_prior_year_groups_by_month_with_weights() {
        let buckets = distributor().distribute(&[
            RevenueAdjustment::prior_year(2024, 6, 1000.0, Some(0.5)),
            RevenueAdjustment::prior_year(2024, 6, 433.0, None),
        ]);

        let expected = (500.0 + 433.0) / 4.33;
        let amount = buckets.prior_year[&PeriodKey::week(2024, 24)];
        assert!((amount - expected).abs() < 1e-9);
    }

    #[test]
    fn test_neighbouring_months_overlap_in_shared_week() {
        // Week 22 of 2024 spans May 27 to Jun 2
        let buckets = distributor().distribute(&[
            RevenueAdjustment::prior_year(2024, 5, 433.0, None),
            RevenueAdjustment::prior_year(2024, 6, 433.0, None),
        ]);

        let shared = buckets.prior_year[&PeriodKey::week(2024, 22)];
        assert!((shared - 200.0).abs() < 1e-9);
        let june_only = buckets.prior_year[&PeriodKey::week(2024, 23)];
        assert!((june_only - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_months_are_skipped() {
        let buckets = distributor().distribute(&[
            RevenueAdjustment::partnership(2024, 0, 500.0),
            RevenueAdjustment::prior_year(2024, 14, 1000.0, None),
            RevenueAdjustment::partnership(2024, 4, 100.0),
        ]);

        assert!(buckets.prior_year.is_empty());
        assert_eq!(buckets.partnership.len(), 1);
        assert!(!buckets.is_empty());
    }
}
