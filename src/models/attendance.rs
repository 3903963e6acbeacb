//! Attendance event models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of a clock event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceKind {
    /// Clock-in.
    #[serde(rename = "ENTRADA")]
    Entry,
    /// Clock-out.
    #[serde(rename = "SALIDA")]
    Exit,
}

/// Where a clock event was marked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// An immutable clock event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    /// Unique identifier.
    pub id: String,
    /// The employee who clocked.
    pub employee_id: String,
    /// Entry or exit.
    pub kind: AttendanceKind,
    /// When the event happened (local time).
    pub timestamp: NaiveDateTime,
    /// Optional location of the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
    /// Set when an administrator marked the event on the employee's behalf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_by_admin_id: Option<String>,
    /// Free-form notes (justification for late entries).
    #[serde(default)]
    pub notes: String,
}

/// The outcome of recording an attendance event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedAttendance {
    /// The stored event.
    pub event: AttendanceEvent,
    /// Minutes late past the tolerance window. Only set for entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_late: Option<i64>,
    /// True when the entry is late, the schedule requires a justification and
    /// none was given.
    pub justification_required: bool,
}

/// A matched entry/exit pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// Id of the entry event.
    pub entry_event_id: String,
    /// Id of the exit event.
    pub exit_event_id: String,
    /// Clock-in instant.
    pub start: NaiveDateTime,
    /// Clock-out instant.
    pub end: NaiveDateTime,
}

/// A clock event that could not be paired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceGap {
    /// The unmatched event.
    pub event_id: String,
    /// Its kind.
    pub kind: AttendanceKind,
    /// Its timestamp.
    pub timestamp: NaiveDateTime,
}

/// Work intervals derived from an attendance log, plus the events that did
/// not fit a pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendancePairing {
    /// Matched pairs in chronological order.
    pub intervals: Vec<WorkInterval>,
    /// Unmatched events in chronological order.
    pub gaps: Vec<AttendanceGap>,
}
