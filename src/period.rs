use crate::error::Result;
use crate::utils::{
    last_completed_fiscal_year_end, last_day_of_month, validate_fiscal_year_end_month,
};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A fiscal year label such as `"2023-24"` (April-March) or `"2024"` (calendar year).
///
/// Periods order by the start year parsed from the leading four digits of the
/// label, then by the label itself. Labels without a leading year sort before
/// every dated label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ReportingPeriod(String);

impl ReportingPeriod {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn start_year(&self) -> Option<i32> {
        let digits = self.0.get(..4)?;
        if digits.bytes().all(|b| b.is_ascii_digit()) {
            digits.parse().ok()
        } else {
            None
        }
    }

    /// Label for the fiscal year that closes on `fiscal_year_end`.
    ///
    /// A December year end is a calendar year and gets a plain `"YYYY"` label;
    /// any other month spans two calendar years and gets `"YYYY-YY"`.
    pub fn for_fiscal_year_end(fiscal_year_end: NaiveDate) -> Self {
        let year = fiscal_year_end.year();
        if fiscal_year_end.month() == 12 {
            Self(format!("{year}"))
        } else {
            Self(format!("{}-{:02}", year - 1, year.rem_euclid(100)))
        }
    }

    /// Last day of this period, or `None` when the label carries no year.
    pub fn end_date(&self, fiscal_year_end_month: u32) -> Result<Option<NaiveDate>> {
        validate_fiscal_year_end_month(fiscal_year_end_month)?;
        let Some(start_year) = self.start_year() else {
            return Ok(None);
        };
        let end_year = if fiscal_year_end_month == 12 {
            start_year
        } else {
            start_year + 1
        };
        Ok(last_day_of_month(end_year, fiscal_year_end_month))
    }
}

impl Ord for ReportingPeriod {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_year()
            .cmp(&other.start_year())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ReportingPeriod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportingPeriod {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for ReportingPeriod {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// Sorts descending (most recent first) and drops duplicates.
pub fn normalize_periods(periods: &mut Vec<ReportingPeriod>) {
    periods.sort_by(|a, b| b.cmp(a));
    periods.dedup();
}

/// The `count` most recent completed fiscal years as of `as_of`, most recent first.
pub fn trailing_periods(
    as_of: NaiveDate,
    fiscal_year_end_month: u32,
    count: usize,
) -> Result<Vec<ReportingPeriod>> {
    validate_fiscal_year_end_month(fiscal_year_end_month)?;

    let Some(latest) = last_completed_fiscal_year_end(as_of, fiscal_year_end_month) else {
        return Ok(Vec::new());
    };

    let periods = (0..count)
        .filter_map(|offset| {
            let year = latest.year() - i32::try_from(offset).ok()?;
            last_day_of_month(year, fiscal_year_end_month)
        })
        .map(ReportingPeriod::for_fiscal_year_end)
        .collect();

    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_by_start_year() {
        let older = ReportingPeriod::from("2022-23");
        let newer = ReportingPeriod::from("2023-24");
        assert!(older < newer);

        let undated = ReportingPeriod::from("Latest");
        assert!(undated < older);
        assert_eq!(newer.start_year(), Some(2023));
        assert_eq!(undated.start_year(), None);
    }

    #[test]
    fn test_normalize_periods() {
        let mut periods: Vec<ReportingPeriod> = ["2022-23", "2024-25", "2023-24", "2022-23"]
            .into_iter()
            .map(ReportingPeriod::from)
            .collect();
        normalize_periods(&mut periods);

        let labels: Vec<&str> = periods.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["2024-25", "2023-24", "2022-23"]);
    }

    #[test]
    fn test_for_fiscal_year_end() {
        let march = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(ReportingPeriod::for_fiscal_year_end(march).label(), "2023-24");

        let december = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(ReportingPeriod::for_fiscal_year_end(december).label(), "2024");

        let century = NaiveDate::from_ymd_opt(2000, 3, 31).unwrap();
        assert_eq!(ReportingPeriod::for_fiscal_year_end(century).label(), "1999-00");
    }

    #[test]
    fn test_end_date() {
        let period = ReportingPeriod::from("2023-24");
        assert_eq!(
            period.end_date(3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31)
        );
        assert_eq!(
            ReportingPeriod::from("2024").end_date(12).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31)
        );
        assert_eq!(ReportingPeriod::from("Latest").end_date(3).unwrap(), None);
        assert!(period.end_date(13).is_err());
    }

    #[test]
    fn test_trailing_periods() {
        let as_of = NaiveDate::from_ymd_opt(2024, 10, 18).unwrap();
        let periods = trailing_periods(as_of, 3, 3).unwrap();
        let labels: Vec<&str> = periods.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["2023-24", "2022-23", "2021-22"]);

        let periods = trailing_periods(as_of, 12, 2).unwrap();
        let labels: Vec<&str> = periods.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["2023", "2022"]);

        assert!(trailing_periods(as_of, 0, 2).is_err());
    }
}
