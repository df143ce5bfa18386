//! Month windows requested from the intraday API.

use chrono::{Duration, NaiveDate};

pub const DEFAULT_MONTH_LIMIT: usize = 24;
pub const LOOKBACK_DAYS: i64 = 730;

/// `YYYY-MM` labels stepping 30 days at a time from `end - 730 days`.
///
/// Consecutive duplicates produced by the 30-day stride are dropped.
pub fn month_windows(end: NaiveDate, month_limit: usize) -> Vec<String> {
    let start = end - Duration::days(LOOKBACK_DAYS);
    let mut months: Vec<String> = (0..month_limit)
        .map(|i| {
            (start + Duration::days(30 * i as i64))
                .format("%Y-%m")
                .to_string()
        })
        .collect();
    months.dedup();
    months
}
