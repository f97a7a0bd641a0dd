use crate::period::{Granularity, Period, PeriodKey, WeekYear};
use crate::schema::{Deal, DealStat, DealStatus};
use log::debug;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct StatAccumulator {
    total_deals: u32,
    won_deals: u32,
    lost_deals: u32,
    total_value: f64,
    won_value: f64,
    lost_value: f64,
}

impl StatAccumulator {
    fn record(&mut self, deal: &Deal) {
        self.total_deals += 1;
        self.total_value += deal.value;

        match deal.status {
            DealStatus::Won => {
                self.won_deals += 1;
                self.won_value += deal.value;
            }
            DealStatus::Lost => {
                self.lost_deals += 1;
                self.lost_value += deal.value;
            }
            DealStatus::Other(_) => {}
        }
    }

    fn finish(self, period: PeriodKey) -> DealStat {
        DealStat {
            period: Period::from(period),
            win_rate: win_rate(self.won_deals, self.total_deals),
            total_deals: self.total_deals,
            won_deals: self.won_deals,
            lost_deals: self.lost_deals,
            total_value: self.total_value,
            won_value: self.won_value,
            lost_value: self.lost_value,
        }
    }
}

/// Rounded percentage of won deals, 0 for an empty period.
pub fn win_rate(won: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(won) / f64::from(total) * 100.0).round() as u32
}

/// Buckets won and lost deals by the date they were decided, newest period first.
///
/// Unlike the forecast, past periods are kept.
pub fn deal_stats(deals: &[Deal], granularity: Granularity, week_year: WeekYear) -> Vec<DealStat> {
    let mut buckets: BTreeMap<PeriodKey, StatAccumulator> = BTreeMap::new();

    for deal in deals {
        let Some(date) = deal.resolution_date() else {
            debug!("Skipping deal without resolution date (status {:?})", deal.status);
            continue;
        };

        if !deal.value.is_finite() || deal.value <= 0.0 {
            debug!("Skipping deal with unusable value {}", deal.value);
            continue;
        }

        buckets
            .entry(granularity.key_for(date, week_year))
            .or_default()
            .record(deal);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(period, acc)| acc.finish(period))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_win_rate_rounding() {
        assert_eq!(win_rate(0, 0), 0);
        assert_eq!(win_rate(1, 3), 33);
        assert_eq!(win_rate(2, 3), 67);
        assert_eq!(win_rate(1, 2), 50);
        assert_eq!(win_rate(5, 5), 100);
    }

    #[test]
    fn test_monthly_stats_bucket_by_resolution_date() {
        let deals = vec![
            Deal::won(1000.0, date(2023, 5, 3), date(2023, 9, 1)),
            Deal::won(500.0, date(2023, 5, 20), date(2023, 6, 1)),
            Deal::lost(300.0, date(2023, 5, 28)),
            Deal::lost(200.0, date(2023, 7, 2)),
        ];
        let stats = deal_stats(&deals, Granularity::Month, WeekYear::Iso);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].period, "2023-07");
        assert_eq!(stats[0].win_rate, 0);
        assert_eq!(stats[0].lost_value, 200.0);

        let may = &stats[1];
        assert_eq!(may.period, "2023-05");
        assert_eq!(may.total_deals, 3);
        assert_eq!(may.won_deals, 2);
        assert_eq!(may.lost_deals, 1);
        assert_eq!(may.total_value, 1800.0);
        assert_eq!(may.won_value, 1500.0);
        assert_eq!(may.lost_value, 300.0);
        assert_eq!(may.win_rate, 67);
    }

    #[test]
    fn test_weekly_stats_sorted_newest_first() {
        let deals = vec![
            Deal::won(100.0, date(2024, 1, 2), date(2024, 2, 1)),
            Deal::lost(100.0, date(2024, 3, 5)),
            Deal::won(100.0, date(2024, 2, 14), date(2024, 2, 20)),
        ];
        let stats = deal_stats(&deals, Granularity::Week, WeekYear::Iso);
        let periods: Vec<&str> = stats.iter().map(|s| s.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-W10", "2024-W07", "2024-W01"]);
    }

    #[test]
    fn test_skips_unresolved_and_worthless_deals() {
        let open = Deal {
            value: 400.0,
            status: DealStatus::Other("Offen".to_string()),
            won_date: Some(date(2024, 1, 2)),
            event_date: None,
            lost_date: None,
        };
        let lost_without_date = Deal {
            lost_date: None,
            ..Deal::lost(100.0, date(2024, 1, 1))
        };
        let deals = vec![
            open,
            lost_without_date,
            Deal::won(0.0, date(2024, 1, 2), date(2024, 1, 3)),
            Deal::won(f64::INFINITY, date(2024, 1, 2), date(2024, 1, 3)),
            Deal::lost(f64::NAN, date(2024, 1, 4)),
        ];
        assert!(deal_stats(&deals, Granularity::Month, WeekYear::Iso).is_empty());
    }

    #[test]
    fn test_win_rate_bounds_hold_for_every_period() {
        let mut deals = Vec::new();
        for day in 1..=28 {
            if day % 3 == 0 {
                deals.push(Deal::lost(50.0, date(2024, 2, day)));
            } else {
                deals.push(Deal::won(50.0, date(2024, 2, day), date(2024, 4, 1)));
            }
        }

        for stat in deal_stats(&deals, Granularity::Week, WeekYear::Iso) {
            assert!(stat.win_rate <= 100);
            assert_eq!(stat.total_deals, stat.won_deals + stat.lost_deals);
            assert_eq!(stat.win_rate, win_rate(stat.won_deals, stat.total_deals));
        }
    }
}
