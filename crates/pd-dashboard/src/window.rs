//! Date windows used by the offline aggregates.
//!
//! The live path delegates windowing to the platform's date literals
//! (`THIS_FISCAL_QUARTER`, `LAST_N_MONTHS:n`); the offline path
//! approximates them with these helpers. The quarter window runs from
//! the first day of the current calendar quarter for 92 days, and the
//! trailing window counts months as 30-day blocks, so both can drift
//! slightly from true calendar boundaries. The approximation is kept
//! so offline results stay reproducible without a fiscal calendar.

use chrono::{Datelike, Duration, NaiveDate};

/// Days covered by the quarter window. Long enough to span any
/// calendar quarter, so month 1 of the next quarter can leak in when
/// the quarter is short.
const QUARTER_WINDOW_DAYS: i64 = 92;

/// Days per month used by the trailing cutoff.
const DAYS_PER_MONTH: i64 = 30;

/// Half-open `[start, end)` window for the calendar quarter containing
/// `today`.
pub fn fiscal_quarter_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let quarter_start_month = (today.month0() / 3) * 3 + 1;
    // The first of a valid month always exists.
    let start = NaiveDate::from_ymd_opt(today.year(), quarter_start_month, 1)
        .unwrap_or(today);
    let end = start + Duration::days(QUARTER_WINDOW_DAYS);
    (start, end)
}

/// Inclusive lower bound for a trailing window of `months` months
/// ending at `today`.
pub fn trailing_months_cutoff(today: NaiveDate, months: u32) -> NaiveDate {
    today - Duration::days(i64::from(months) * DAYS_PER_MONTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quarter_starts() {
        assert_eq!(fiscal_quarter_window(date(2026, 1, 15)).0, date(2026, 1, 1));
        assert_eq!(fiscal_quarter_window(date(2026, 3, 31)).0, date(2026, 1, 1));
        assert_eq!(fiscal_quarter_window(date(2026, 4, 1)).0, date(2026, 4, 1));
        assert_eq!(fiscal_quarter_window(date(2026, 8, 27)).0, date(2026, 7, 1));
        assert_eq!(fiscal_quarter_window(date(2026, 12, 31)).0, date(2026, 10, 1));
    }

    #[test]
    fn test_quarter_window_is_92_days() {
        let (start, end) = fiscal_quarter_window(date(2026, 2, 10));
        assert_eq!((end - start).num_days(), 92);
        assert_eq!(end, date(2026, 4, 3));
    }

    #[test]
    fn test_window_is_half_open() {
        let (start, end) = fiscal_quarter_window(date(2026, 8, 27));
        assert!(start <= date(2026, 8, 27));
        assert!(date(2026, 8, 27) < end);
    }

    #[test]
    fn test_trailing_cutoff_uses_30_day_months() {
        let today = date(2026, 8, 27);
        assert_eq!(trailing_months_cutoff(today, 1), date(2026, 7, 28));
        assert_eq!(trailing_months_cutoff(today, 12), today - Duration::days(360));
    }
}
