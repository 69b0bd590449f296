use crate::error::{Result, StatementError};
use chrono::{Datelike, NaiveDate};

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

pub fn validate_fiscal_year_end_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(StatementError::InvalidFiscalYearEndMonth(month));
    }
    Ok(())
}

/// Get the fiscal year end date for a given date
/// Returns the fiscal year end date that this date belongs to
pub fn get_fiscal_year_end_for_date(date: NaiveDate, fiscal_month: u32) -> Option<NaiveDate> {
    // Past the fiscal year end month means the FY ends next calendar year
    if date.month() <= fiscal_month {
        last_day_of_month(date.year(), fiscal_month)
    } else {
        last_day_of_month(date.year() + 1, fiscal_month)
    }
}

/// Most recent fiscal year end on or before `date`.
pub fn last_completed_fiscal_year_end(date: NaiveDate, fiscal_month: u32) -> Option<NaiveDate> {
    let current = get_fiscal_year_end_for_date(date, fiscal_month)?;
    if current <= date {
        Some(current)
    } else {
        last_day_of_month(current.year() - 1, fiscal_month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2023, 2),
            NaiveDate::from_ymd_opt(2023, 2, 28)
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            last_day_of_month(2023, 12),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
    }

    #[test]
    fn test_validate_fiscal_year_end_month() {
        assert!(validate_fiscal_year_end_month(3).is_ok());
        assert!(validate_fiscal_year_end_month(12).is_ok());
        assert!(matches!(
            validate_fiscal_year_end_month(0),
            Err(StatementError::InvalidFiscalYearEndMonth(0))
        ));
        assert!(validate_fiscal_year_end_month(13).is_err());
    }

    #[test]
    fn test_fiscal_year_end_for_date() {
        // April-March year
        let date = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert_eq!(
            get_fiscal_year_end_for_date(date, 3),
            NaiveDate::from_ymd_opt(2024, 3, 31)
        );

        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(
            get_fiscal_year_end_for_date(date, 3),
            NaiveDate::from_ymd_opt(2025, 3, 31)
        );
    }

    #[test]
    fn test_last_completed_fiscal_year_end() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(
            last_completed_fiscal_year_end(date, 3),
            NaiveDate::from_ymd_opt(2024, 3, 31)
        );

        // The year end itself counts as completed
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            last_completed_fiscal_year_end(date, 3),
            NaiveDate::from_ymd_opt(2024, 3, 31)
        );

        let date = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();
        assert_eq!(
            last_completed_fiscal_year_end(date, 3),
            NaiveDate::from_ymd_opt(2023, 3, 31)
        );
    }
}
