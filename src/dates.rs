//! Calendar-date to ISO-week derivation.
//!
//! Week 1 is the week containing the year's first Thursday, so early-January
//! dates can land in the previous ISO year's final week (e.g. 2021-01-01 is
//! week 53). Callers that cannot reject bad dates substitute week 1 via
//! `week_or_default` — a deliberate fallback policy, not a crash.

use chrono::{Datelike, NaiveDate};

/// Week substituted when the date triple is not a real calendar date.
pub const DEFAULT_WEEK: u32 = 1;

/// The (year, month, day) triple does not form a valid calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid calendar date: {year:04}-{month:02}-{day:02}")]
pub struct InvalidDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// ISO week number of the given calendar date.
pub fn derive_week(year: i32, month: u32, day: u32) -> Result<u32, InvalidDate> {
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(InvalidDate { year, month, day })?;
    Ok(date.iso_week().week())
}

/// `derive_week` with the fallback policy applied.
///
/// Returns `(week, used_fallback)` so callers can surface a warning when the
/// default was substituted.
pub fn week_or_default(year: i32, month: u32, day: u32) -> (u32, bool) {
    match derive_week(year, month, day) {
        Ok(week) => (week, false),
        Err(_) => (DEFAULT_WEEK, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_monday_of_2024_is_week_one() {
        // Jan 1 2024 is a Monday, so it opens ISO week 1.
        assert_eq!(derive_week(2024, 1, 1), Ok(1));
    }

    #[test]
    fn early_january_can_belong_to_previous_iso_year() {
        // Jan 1 2021 is a Friday; ISO puts it in week 53 of 2020.
        assert_eq!(derive_week(2021, 1, 1), Ok(53));
    }

    #[test]
    fn nonexistent_date_fails() {
        let err = derive_week(2024, 2, 30).unwrap_err();
        assert_eq!(
            err,
            InvalidDate {
                year: 2024,
                month: 2,
                day: 30
            }
        );
        assert_eq!(err.to_string(), "invalid calendar date: 2024-02-30");
    }

    #[test]
    fn fallback_substitutes_week_one() {
        assert_eq!(week_or_default(2024, 2, 30), (DEFAULT_WEEK, true));
        assert_eq!(week_or_default(2024, 1, 1), (1, false));
    }
}
