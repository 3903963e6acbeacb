//! Request types for the ledger API.
//!
//! Operations whose input maps one-to-one onto an engine input take that
//! type directly (`NewAttendance`, `OvertimeRequest`, ...), and `PUT /holidays`
//! takes a [`HolidaySeed`](crate::config::HolidaySeed). The types here
//! cover the remaining bodies and query strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::ScheduleConfig;

/// Body of `PUT /schedule/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfigRequest {
    /// The new configuration.
    #[serde(flatten)]
    pub config: ScheduleConfig,
    /// Version the administrator edited; absent when creating the first one.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Body of the approve endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequest {
    /// The authenticated approver.
    pub approver_id: String,
}

/// Body of the reject endpoints. Vacation clients may send `reason`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    /// The authenticated approver.
    pub approver_id: String,
    /// Why the record is rejected.
    #[serde(alias = "reason", default)]
    pub comment: String,
}

/// Body of `POST /hour-bank/:employee_id/compensatory-day`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensatoryDayRequest {
    /// The day off.
    pub date: NaiveDate,
    /// Minutes debited.
    pub minutes: i64,
    /// Who approved the day off.
    pub approver_id: String,
}

/// Body of `PUT /vacations/:id/:year/entitlement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementRequest {
    /// Days granted for the year.
    pub total_days: u32,
}

/// `?from=&to=` query for attendance reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeQuery {
    /// First date (inclusive).
    pub from: NaiveDate,
    /// Last date (inclusive).
    pub to: NaiveDate,
}

/// `?year=` query for holiday listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearQuery {
    /// Limit to one year.
    #[serde(default)]
    pub year: Option<i32>,
}
