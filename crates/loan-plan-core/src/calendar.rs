//! Calendar-month arithmetic for due dates and phase durations.
//!
//! Only the year and month of a date matter when counting whole months;
//! the day of month is carried along and clamped to the end of shorter
//! months when advancing.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::LoanPlanError;
use crate::LoanPlanResult;

/// Advance `date` by `months` calendar months, clamping the day of month.
pub fn add_months(date: NaiveDate, months: u32) -> LoanPlanResult<NaiveDate> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        LoanPlanError::DateError(format!("{date} + {months} months is out of range"))
    })
}

/// Whole-month difference `12*(y2-y1) + (m2-m1)`, ignoring the day of month.
/// Negative when `to` falls in an earlier month than `from`.
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    12 * (i64::from(to.year()) - i64::from(from.year()))
        + (i64::from(to.month()) - i64::from(from.month()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_keeps_day() {
        assert_eq!(add_months(date(2010, 9, 15), 1).unwrap(), date(2010, 10, 15));
        assert_eq!(add_months(date(2010, 12, 15), 1).unwrap(), date(2011, 1, 15));
        assert_eq!(add_months(date(2010, 9, 15), 120).unwrap(), date(2020, 9, 15));
    }

    #[test]
    fn test_add_months_clamps_month_end() {
        assert_eq!(add_months(date(2010, 1, 31), 1).unwrap(), date(2010, 2, 28));
        assert_eq!(add_months(date(2012, 1, 31), 1).unwrap(), date(2012, 2, 29));
        assert_eq!(add_months(date(2010, 3, 31), 1).unwrap(), date(2010, 4, 30));
    }

    #[test]
    fn test_add_months_out_of_range() {
        let result = add_months(NaiveDate::MAX, 1);
        assert!(matches!(result, Err(LoanPlanError::DateError(_))));
    }

    #[test]
    fn test_whole_months_between_ignores_day() {
        assert_eq!(whole_months_between(date(2010, 9, 15), date(2013, 9, 15)), 36);
        assert_eq!(whole_months_between(date(2010, 9, 30), date(2010, 10, 1)), 1);
        assert_eq!(whole_months_between(date(2010, 9, 1), date(2010, 9, 30)), 0);
        assert_eq!(whole_months_between(date(2013, 9, 15), date(2010, 9, 15)), -36);
    }
}
