//! Business-day counting for vacation requests.

use chrono::{Datelike, NaiveDate, Weekday};

/// Counts Monday to Friday dates in `[start, end]`, both inclusive.
///
/// Returns 0 when `end < start`. Holidays are not excluded.
///
/// # Example
///
/// ```
/// use time_ledger::calculation::count_business_days;
/// use chrono::NaiveDate;
///
/// // Friday 2025-01-03 to Monday 2025-01-06
/// let start = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
/// assert_eq!(count_business_days(start, end), 2);
/// ```
pub fn count_business_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }

    let total_days = (end - start).num_days() + 1;
    let full_weeks = total_days / 7;
    let mut count = full_weeks * 5;

    // Walk the remainder, at most six dates
    let mut date = start + chrono::Duration::days(full_weeks * 7);
    while date <= end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    u32::try_from(count).unwrap_or(u32::MAX)
}
