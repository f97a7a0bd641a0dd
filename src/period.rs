use crate::calendar::{month_key, week_key};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bucket identifier for a forecast period: `YYYY-Www` for weeks, `YYYY-MM` for months.
///
/// Both formats are zero-padded so that the derived string ordering is also
/// the chronological ordering. Every sort in the crate relies on this.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct PeriodKey(String);

impl PeriodKey {
    pub fn week(year: i32, week: u32) -> Self {
        Self(format!("{:04}-W{:02}", year, week))
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self(format!("{:04}-{:02}", year, month))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_week(&self) -> bool {
        self.0.contains("-W")
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PeriodKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for PeriodKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A [`PeriodKey`] tagged with its granularity.
///
/// Flattened into output rows it becomes a `"week"` or `"month"` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week(PeriodKey),
    Month(PeriodKey),
}

impl Period {
    pub fn key(&self) -> &PeriodKey {
        match self {
            Period::Week(key) | Period::Month(key) => key,
        }
    }

    pub fn as_str(&self) -> &str {
        self.key().as_str()
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            Period::Week(_) => Granularity::Week,
            Period::Month(_) => Granularity::Month,
        }
    }
}

impl From<PeriodKey> for Period {
    fn from(key: PeriodKey) -> Self {
        if key.is_week() {
            Period::Week(key)
        } else {
            Period::Month(key)
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.key(), f)
    }
}

impl PartialEq<&str> for Period {
    fn eq(&self, other: &&str) -> bool {
        self.key() == other
    }
}

/// Which year labels a week key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeekYear {
    /// ISO 8601 week-year. Dec 29 2025 is `2026-W01`, Jan 1 2027 is `2026-W53`.
    #[default]
    Iso,
    /// Calendar year of the date paired with its ISO week number.
    ///
    /// Reproduces the legacy labels, where Dec 31 2024 becomes `2024-W01` and
    /// sorts before the rest of that December.
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Week,
    Month,
}

impl Granularity {
    pub fn key_for(self, date: NaiveDate, week_year: WeekYear) -> PeriodKey {
        match self {
            Granularity::Week => week_key(date, week_year),
            Granularity::Month => month_key(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_zero_padded() {
        assert_eq!(PeriodKey::week(2024, 3), "2024-W03");
        assert_eq!(PeriodKey::month(2024, 3), "2024-03");
        assert!(PeriodKey::week(2024, 3).is_week());
        assert!(!PeriodKey::month(2024, 3).is_week());
    }

    #[test]
    fn test_string_order_is_chronological() {
        let mut keys = vec![
            PeriodKey::week(2025, 1),
            PeriodKey::week(2024, 10),
            PeriodKey::week(2024, 9),
            PeriodKey::week(2024, 52),
        ];
        keys.sort();
        let labels: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(labels, vec!["2024-W09", "2024-W10", "2024-W52", "2025-W01"]);

        assert!(PeriodKey::month(2024, 9) < PeriodKey::month(2024, 10));
        assert!(PeriodKey::month(2024, 12) < PeriodKey::month(2025, 1));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&PeriodKey::week(2024, 4)).unwrap();
        assert_eq!(json, "\"2024-W04\"");
    }

    #[test]
    fn test_period_tag_follows_key_format() {
        let week = Period::from(PeriodKey::week(2024, 4));
        let month = Period::from(PeriodKey::month(2024, 4));
        assert_eq!(week.granularity(), Granularity::Week);
        assert_eq!(month.granularity(), Granularity::Month);
        assert_eq!(week, "2024-W04");

        assert_eq!(serde_json::to_string(&week).unwrap(), r#"{"week":"2024-W04"}"#);
        assert_eq!(serde_json::to_string(&month).unwrap(), r#"{"month":"2024-04"}"#);
    }
}
