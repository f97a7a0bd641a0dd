use crate::error::{ForecastError, Result};
use crate::period::{PeriodKey, WeekYear};
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeSet;

/// ISO 8601 week number: the week holding the Thursday of the date's Monday-based week.
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// ISO 8601 week-year, which differs from the calendar year for a few days around New Year.
pub fn iso_week_year(date: NaiveDate) -> i32 {
    date.iso_week().year()
}

pub fn week_key(date: NaiveDate, week_year: WeekYear) -> PeriodKey {
    let year = match week_year {
        WeekYear::Iso => iso_week_year(date),
        WeekYear::Calendar => date.year(),
    };
    PeriodKey::week(year, iso_week(date))
}

pub fn month_key(date: NaiveDate) -> PeriodKey {
    PeriodKey::month(date.year(), date.month())
}

/// Returns `None` only when the result falls outside chrono's supported range.
pub fn add_weeks(date: NaiveDate, weeks: u32) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(weeks) * 7))
}

pub fn validate_month(year: i32, month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(ForecastError::InvalidMonth { year, month });
    }
    Ok(())
}

pub fn first_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    validate_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        ForecastError::InvalidDate(format!("{:04}-{:02} is outside the supported range", year, month))
    })
}

pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    validate_month(year, month)?;
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or_else(|| {
            ForecastError::InvalidDate(format!(
                "{:04}-{:02} is outside the supported range",
                year, month
            ))
        })
}

/// Week key of the final calendar day of the month.
pub fn last_week_of_month(year: i32, month: u32, week_year: WeekYear) -> Result<PeriodKey> {
    let last_day = last_day_of_month(year, month)?;
    Ok(week_key(last_day, week_year))
}

/// Every distinct week key touched by a day of the month, ascending.
pub fn weeks_in_month(year: i32, month: u32, week_year: WeekYear) -> Result<BTreeSet<PeriodKey>> {
    let first = first_day_of_month(year, month)?;
    let last = last_day_of_month(year, month)?;

    Ok(first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|d| week_key(d, week_year))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_week_numbers() {
        assert_eq!(iso_week(date(2024, 1, 1)), 1);
        assert_eq!(iso_week(date(2024, 1, 22)), 4);
        assert_eq!(iso_week(date(2024, 6, 1)), 22);
        assert_eq!(iso_week(date(2024, 12, 29)), 52);
        // Friday Jan 1 2021 sits in the last week of 2020
        assert_eq!(iso_week(date(2021, 1, 1)), 53);
        // Tuesday Dec 31 2024 sits in the first week of 2025
        assert_eq!(iso_week(date(2024, 12, 31)), 1);
    }

    #[test]
    fn test_week_key_year_boundaries() {
        assert_eq!(week_key(date(2024, 12, 31), WeekYear::Iso), "2025-W01");
        assert_eq!(week_key(date(2024, 12, 31), WeekYear::Calendar), "2024-W01");

        assert_eq!(week_key(date(2021, 1, 1), WeekYear::Iso), "2020-W53");
        assert_eq!(week_key(date(2021, 1, 1), WeekYear::Calendar), "2021-W53");

        assert_eq!(week_key(date(2024, 7, 10), WeekYear::Iso), "2024-W28");
        assert_eq!(week_key(date(2024, 7, 10), WeekYear::Calendar), "2024-W28");
    }

    #[test]
    fn test_iso_keys_stay_chronological_across_new_year() {
        let days: Vec<NaiveDate> = date(2024, 12, 20)
            .iter_days()
            .take(30)
            .collect();
        let keys: Vec<PeriodKey> = days.iter().map(|d| week_key(*d, WeekYear::Iso)).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(date(2024, 3, 15)), "2024-03");
        assert_eq!(month_key(date(2024, 12, 31)), "2024-12");
    }

    #[test]
    fn test_add_weeks() {
        assert_eq!(add_weeks(date(2024, 1, 1), 3), Some(date(2024, 1, 22)));
        assert_eq!(add_weeks(date(2024, 12, 20), 3), Some(date(2025, 1, 10)));
        assert_eq!(add_weeks(date(2024, 2, 10), 0), Some(date(2024, 2, 10)));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2023, 2).unwrap(), date(2023, 2, 28));
        assert_eq!(last_day_of_month(2024, 2).unwrap(), date(2024, 2, 29));
        assert_eq!(last_day_of_month(2024, 12).unwrap(), date(2024, 12, 31));
        assert!(matches!(
            last_day_of_month(2024, 13),
            Err(ForecastError::InvalidMonth { month: 13, .. })
        ));
        assert!(last_day_of_month(2024, 0).is_err());
    }

    #[test]
    fn test_last_week_of_month() {
        assert_eq!(last_week_of_month(2024, 3, WeekYear::Iso).unwrap(), "2024-W13");
        assert_eq!(last_week_of_month(2024, 12, WeekYear::Iso).unwrap(), "2025-W01");
        assert_eq!(last_week_of_month(2024, 12, WeekYear::Calendar).unwrap(), "2024-W01");
    }

    #[test]
    fn test_weeks_in_month() {
        let june: Vec<String> = weeks_in_month(2024, 6, WeekYear::Iso)
            .unwrap()
            .into_iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(
            june,
            vec!["2024-W22", "2024-W23", "2024-W24", "2024-W25", "2024-W26"]
        );

        let feb_2021 = weeks_in_month(2021, 2, WeekYear::Iso).unwrap();
        assert_eq!(feb_2021.len(), 4);

        let jan_2021 = weeks_in_month(2021, 1, WeekYear::Iso).unwrap();
        assert_eq!(jan_2021.iter().next().unwrap(), &PeriodKey::week(2020, 53));
    }
}
