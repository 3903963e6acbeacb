//! Attendance recording.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::Engine;
use crate::calculation::{minutes_late, pair_attendance};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceEvent, AttendanceKind, AttendancePairing, GeoPoint, RecordedAttendance,
};
use crate::store::{Document, WriteBatch};

/// Input for [`Engine::record_attendance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAttendance {
    /// The employee clocking.
    pub employee_id: String,
    /// Entry or exit.
    pub kind: AttendanceKind,
    /// When the event happened.
    pub timestamp: NaiveDateTime,
    /// Set when an administrator marks on the employee's behalf.
    #[serde(default)]
    pub marked_by_admin_id: Option<String>,
    /// Justification or other notes.
    #[serde(default)]
    pub notes: String,
    /// Device location.
    #[serde(default)]
    pub geo: Option<GeoPoint>,
}

impl Engine {
    /// Appends a clock event.
    ///
    /// Entries are checked against the resolved schedule for their date.
    /// Late entries without a required justification are still stored; the
    /// result flags them.
    ///
    /// # Errors
    ///
    /// `NotFound`/`ValidationError` for unknown or inactive employees,
    /// `ValidationError` for coordinates out of range, and
    /// `ConfigurationMissing` when an entry cannot be resolved against any
    /// schedule.
    pub fn record_attendance(&self, input: NewAttendance) -> EngineResult<RecordedAttendance> {
        self.active_employee(&input.employee_id)?;
        if let Some(geo) = &input.geo {
            validate_geo(geo)?;
        }

        let (minutes_late, justification_required) = match input.kind {
            AttendanceKind::Entry => {
                let schedule = self.resolve_schedule(&input.employee_id, input.timestamp.date())?;
                let late = minutes_late(input.timestamp, &schedule);
                let required =
                    late > 0 && schedule.requires_justification && input.notes.trim().is_empty();
                (Some(late), required)
            }
            AttendanceKind::Exit => (None, false),
        };

        let event = AttendanceEvent {
            id: Uuid::new_v4().to_string(),
            employee_id: input.employee_id,
            kind: input.kind,
            timestamp: input.timestamp,
            geo: input.geo,
            marked_by_admin_id: input.marked_by_admin_id,
            notes: input.notes,
        };
        self.store
            .commit(WriteBatch::new().insert(Document::Attendance(event.clone())))?;

        if justification_required {
            warn!(
                employee_id = %event.employee_id,
                event_id = %event.id,
                minutes_late = minutes_late.unwrap_or_default(),
                "Late entry recorded without justification"
            );
        } else {
            info!(
                employee_id = %event.employee_id,
                event_id = %event.id,
                kind = ?event.kind,
                timestamp = %event.timestamp,
                admin = event.marked_by_admin_id.as_deref().unwrap_or("-"),
                "Attendance recorded"
            );
        }

        Ok(RecordedAttendance {
            event,
            minutes_late,
            justification_required,
        })
    }

    /// An employee's events on dates `from..=to`, ordered by timestamp.
    pub fn attendance_log(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendanceEvent>> {
        if to < from {
            return Err(EngineError::validation(
                "to",
                format!("{} is before {}", to, from),
            ));
        }
        self.store.attendance_events(employee_id, from, to)
    }

    /// Pairs the employee's events on dates `from..=to` into work intervals.
    pub fn attendance_pairing(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<AttendancePairing> {
        Ok(pair_attendance(&self.attendance_log(employee_id, from, to)?))
    }
}

fn validate_geo(geo: &GeoPoint) -> EngineResult<()> {
    if !(-90.0..=90.0).contains(&geo.latitude) {
        return Err(EngineError::validation(
            "geo.latitude",
            format!("{} is outside [-90, 90]", geo.latitude),
        ));
    }
    if !(-180.0..=180.0).contains(&geo.longitude) {
        return Err(EngineError::validation(
            "geo.longitude",
            format!("{} is outside [-180, 180]", geo.longitude),
        ));
    }
    Ok(())
}
