//! Interval segmentation at midnight and night-band boundaries.
//!
//! An interval is cut every time it crosses midnight or either edge of the
//! night band, so each resulting segment lies within one calendar date and
//! one band. The classifier then decides the type of each segment from its
//! date and band.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::NightWindow;

/// The band of the day a segment falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBand {
    /// Outside the night band.
    Day,
    /// Inside the night band.
    Night,
}

impl std::fmt::Display for TimeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeBand::Day => write!(f, "day"),
            TimeBand::Night => write!(f, "night"),
        }
    }
}

/// A piece of an interval within one calendar date and one band.
///
/// # Example
///
/// ```
/// use time_ledger::calculation::{segment_interval, TimeBand};
/// use time_ledger::config::NightWindow;
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
///
/// // 19:00 to 01:00 crosses the 21:00 night edge and midnight
/// let segments = segment_interval(
///     at("2025-01-06 19:00:00"),
///     at("2025-01-07 01:00:00"),
///     &NightWindow::default(),
/// );
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[0].band, TimeBand::Day);
/// assert_eq!(segments[0].minutes, 120);
/// assert_eq!(segments[1].band, TimeBand::Night);
/// assert_eq!(segments[1].minutes, 180);
/// assert_eq!(segments[2].start, at("2025-01-07 00:00:00"));
/// assert_eq!(segments[2].minutes, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSegment {
    /// The start time of this segment.
    pub start: NaiveDateTime,
    /// The end time of this segment.
    pub end: NaiveDateTime,
    /// The band this segment falls in.
    pub band: TimeBand,
    /// Duration rounded to the nearest minute.
    pub minutes: i64,
}

/// Splits `[start, end)` at every midnight and night-band edge.
///
/// Returns segments in chronological order. Segments shorter than half a
/// minute round to zero minutes and are dropped. Returns an empty vector
/// when `end <= start`.
pub fn segment_interval(
    start: NaiveDateTime,
    end: NaiveDateTime,
    night: &NightWindow,
) -> Vec<TimeSegment> {
    let mut segments = Vec::new();
    let mut current_start = start;

    while current_start < end {
        let boundary = next_boundary(current_start, night);

        // Segment ends at either the boundary or interval end, whichever is first
        let segment_end = if boundary <= end { boundary } else { end };

        let minutes = rounded_minutes(current_start, segment_end);
        if minutes > 0 {
            segments.push(TimeSegment {
                start: current_start,
                end: segment_end,
                band: band_of(current_start.time(), night),
                minutes,
            });
        }

        current_start = segment_end;
    }

    segments
}

/// The first midnight or night-band edge strictly after `current`.
fn next_boundary(current: NaiveDateTime, night: &NightWindow) -> NaiveDateTime {
    let date = current.date();
    // The last representable day has no following midnight
    let midnight = date
        .succ_opt()
        .map_or(NaiveDateTime::MAX, |next| next.and_time(NaiveTime::MIN));

    [date.and_time(night.start), date.and_time(night.end)]
        .into_iter()
        .filter(|edge| *edge > current)
        .fold(midnight, |earliest, edge| earliest.min(edge))
}

fn band_of(time: NaiveTime, night: &NightWindow) -> TimeBand {
    if night.contains(time) {
        TimeBand::Night
    } else {
        TimeBand::Day
    }
}

/// Minutes between two instants, rounded half up.
pub(crate) fn rounded_minutes(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    ((end - start).num_seconds() + 30).div_euclid(60)
}
