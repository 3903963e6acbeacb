//! HTTP API module for the Time & Pay Ledger Engine.
//!
//! This module exposes the engine operations as REST endpoints wrapped
//! in a `{success, data | error}` envelope.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ApproveRequest, CompensatoryDayRequest, DateRangeQuery, EntitlementRequest, RejectRequest,
    ScheduleConfigRequest, YearQuery,
};
pub use response::{ApiError, ApiErrorResponse, ApiResponse};
pub use state::AppState;
