//! Lateness and attendance pairing.
//!
//! The attendance log is permissive, so pairing never fails: events that do
//! not form an entry/exit pair are reported as gaps for manual correction.

use chrono::NaiveDateTime;

use crate::models::{
    AttendanceEvent, AttendanceGap, AttendanceKind, AttendancePairing, ResolvedSchedule,
    WorkInterval,
};

/// Whole minutes past the tolerance window, never negative.
///
/// # Example
///
/// ```
/// use time_ledger::calculation::minutes_late;
/// use time_ledger::models::{ResolvedSchedule, ScheduleSource};
/// use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
///
/// let schedule = ResolvedSchedule {
///     date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
///     entry_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     exit_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
///     tolerance_minutes: 10,
///     requires_justification: false,
///     source: ScheduleSource::Global,
/// };
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
///
/// assert_eq!(minutes_late(at("2025-01-06 09:08:00"), &schedule), 0);
/// assert_eq!(minutes_late(at("2025-01-06 09:25:00"), &schedule), 15);
/// ```
pub fn minutes_late(timestamp: NaiveDateTime, schedule: &ResolvedSchedule) -> i64 {
    (timestamp - schedule.late_after()).num_minutes().max(0)
}

/// Pairs each entry with the next exit in chronological order.
///
/// An entry followed by another entry, an exit with no open entry, and a
/// trailing open entry are all reported as gaps.
pub fn pair_attendance(events: &[AttendanceEvent]) -> AttendancePairing {
    let mut sorted: Vec<&AttendanceEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let mut pairing = AttendancePairing::default();
    let mut open_entry: Option<&AttendanceEvent> = None;

    for event in sorted {
        match event.kind {
            AttendanceKind::Entry => {
                if let Some(previous) = open_entry.replace(event) {
                    pairing.gaps.push(gap(previous));
                }
            }
            AttendanceKind::Exit => match open_entry.take() {
                Some(entry) => pairing.intervals.push(WorkInterval {
                    entry_event_id: entry.id.clone(),
                    exit_event_id: event.id.clone(),
                    start: entry.timestamp,
                    end: event.timestamp,
                }),
                None => pairing.gaps.push(gap(event)),
            },
        }
    }

    if let Some(entry) = open_entry {
        pairing.gaps.push(gap(entry));
    }

    pairing
}

fn gap(event: &AttendanceEvent) -> AttendanceGap {
    AttendanceGap {
        event_id: event.id.clone(),
        kind: event.kind,
        timestamp: event.timestamp,
    }
}
