//! Trailing-year window arithmetic.

use chrono::{Duration, NaiveDate};

use crate::error::ApiError;
use crate::model::DATE_FORMAT;

/// Length of the trailing window in days.
pub const TRAILING_WINDOW_DAYS: i64 = 365;

/// First date of the window ending at `most_recent`, i.e.
/// `most_recent - 365 days`, formatted as `YYYY-MM-DD`.
///
/// `most_recent` comes from the store, so a parse failure means bad data
/// rather than bad input.
pub fn trailing_year_cutoff(most_recent: &str) -> Result<String, ApiError> {
    let date = NaiveDate::parse_from_str(most_recent, DATE_FORMAT)
        .map_err(|_| ApiError::InvalidStoredDate(most_recent.to_string()))?;

    let cutoff = date - Duration::days(TRAILING_WINDOW_DAYS);
    Ok(cutoff.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_one_year_back() {
        assert_eq!(trailing_year_cutoff("2017-08-23").unwrap(), "2016-08-23");
    }

    #[test]
    fn test_cutoff_across_leap_day() {
        // 2016 is a leap year, so 365 days before 2016-03-01 is 2015-03-02.
        assert_eq!(trailing_year_cutoff("2016-03-01").unwrap(), "2015-03-02");
    }

    #[test]
    fn test_malformed_stored_date() {
        let err = trailing_year_cutoff("08/23/2017").unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
