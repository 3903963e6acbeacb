//! HTTP request handlers for the ledger API.
//!
//! Handlers parse the request, call one engine operation and wrap the
//! result in the response envelope. Every request gets a correlation id
//! that appears in all of its log lines.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::HolidaySeed;
use crate::engine::{
    NewAttendance, NewHourBankEntry, NewSpecialSchedule, NewVacationRequest, OvertimeRequest,
};
use crate::error::{EngineError, EngineResult};

use super::request::{
    ApproveRequest, CompensatoryDayRequest, DateRangeQuery, EntitlementRequest, RejectRequest,
    ScheduleConfigRequest, YearQuery,
};
use super::response::{ApiError, ApiErrorResponse, ApiResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
///
/// Routes under `/vacations` share the parameter name `:id` at the second
/// position; it holds a request id or an employee id depending on the route.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/attendance", post(record_attendance))
        .route("/attendance/:employee_id", get(attendance_log))
        .route("/attendance/:employee_id/pairing", get(attendance_pairing))
        .route("/schedule/config", get(get_schedule_config).put(update_schedule_config))
        .route("/schedule/special", post(assign_special_schedule))
        .route("/schedule/special/:employee_id", get(list_special_schedules))
        .route("/schedule/:employee_id/:date", get(resolve_schedule))
        .route("/holidays", put(upsert_holiday).get(list_holidays))
        .route("/holidays/:date", get(classify_date))
        .route("/overtime/classify", post(classify_overtime))
        .route("/overtime/:id", get(get_overtime))
        .route("/overtime/:id/approve", post(approve_overtime))
        .route("/overtime/:id/reject", post(reject_overtime))
        .route("/hour-bank", post(append_hour_bank_entry))
        .route("/hour-bank/reconcile", post(reconcile_all))
        .route("/hour-bank/:employee_id/balance", get(get_balance))
        .route("/hour-bank/:employee_id/entries", get(hour_bank_entries))
        .route("/hour-bank/:employee_id/reconcile", post(reconcile))
        .route(
            "/hour-bank/:employee_id/compensatory-day",
            post(take_compensatory_day),
        )
        .route("/vacations", post(request_vacation))
        .route("/vacations/:id", get(get_vacation_request))
        .route("/vacations/:id/approve", post(approve_vacation))
        .route("/vacations/:id/reject", post(reject_vacation))
        .route("/vacations/:id/:year", get(vacation_requests))
        .route("/vacations/:id/:year/balance", get(get_vacation_balance))
        .route(
            "/vacations/:id/:year/entitlement",
            put(set_vacation_entitlement),
        )
        .with_state(state)
}

// ============================================================================
// Attendance
// ============================================================================

async fn record_attendance(
    State(state): State<AppState>,
    payload: Result<Json<NewAttendance>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let input = match json_body(payload, correlation_id) {
        Ok(input) => input,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        employee_id = %input.employee_id,
        kind = ?input.kind,
        "Processing attendance request"
    );
    respond(
        correlation_id,
        "record_attendance",
        StatusCode::CREATED,
        state.engine().record_attendance(input),
    )
}

async fn attendance_log(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (employee_id, range) = match (
        path_params(path, correlation_id),
        query_params(query, correlation_id),
    ) {
        (Ok(employee_id), Ok(range)) => (employee_id, range),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    respond(
        correlation_id,
        "attendance_log",
        StatusCode::OK,
        state.engine().attendance_log(&employee_id, range.from, range.to),
    )
}

async fn attendance_pairing(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (employee_id, range) = match (
        path_params(path, correlation_id),
        query_params(query, correlation_id),
    ) {
        (Ok(employee_id), Ok(range)) => (employee_id, range),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    respond(
        correlation_id,
        "attendance_pairing",
        StatusCode::OK,
        state
            .engine()
            .attendance_pairing(&employee_id, range.from, range.to),
    )
}

// ============================================================================
// Schedules
// ============================================================================

async fn resolve_schedule(
    State(state): State<AppState>,
    path: Result<Path<(String, NaiveDate)>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (employee_id, date) = match path_params(path, correlation_id) {
        Ok(params) => params,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "resolve_schedule",
        StatusCode::OK,
        state.engine().resolve_schedule(&employee_id, date),
    )
}

async fn get_schedule_config(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state.engine().schedule_config().and_then(|config| {
        config.ok_or_else(|| EngineError::ConfigurationMissing {
            message: "no global schedule has been configured".to_string(),
        })
    });
    respond(correlation_id, "get_schedule_config", StatusCode::OK, result)
}

async fn update_schedule_config(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleConfigRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "update_schedule_config",
        StatusCode::OK,
        state
            .engine()
            .update_schedule_config(request.config, request.expected_version),
    )
}

async fn assign_special_schedule(
    State(state): State<AppState>,
    payload: Result<Json<NewSpecialSchedule>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let input = match json_body(payload, correlation_id) {
        Ok(input) => input,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "assign_special_schedule",
        StatusCode::CREATED,
        state.engine().assign_special_schedule(input),
    )
}

async fn list_special_schedules(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let employee_id = match path_params(path, correlation_id) {
        Ok(employee_id) => employee_id,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "list_special_schedules",
        StatusCode::OK,
        state.engine().list_special_schedules(&employee_id),
    )
}

// ============================================================================
// Holidays
// ============================================================================

async fn upsert_holiday(
    State(state): State<AppState>,
    payload: Result<Json<HolidaySeed>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let seed = match json_body(payload, correlation_id) {
        Ok(seed) => seed,
        Err(response) => return response,
    };
    let engine = state.engine();
    let holiday = seed.into_holiday(engine.policy().default_holiday_multiplier);
    respond(
        correlation_id,
        "upsert_holiday",
        StatusCode::OK,
        engine.upsert_holiday(holiday),
    )
}

async fn list_holidays(
    State(state): State<AppState>,
    query: Result<Query<YearQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match query_params(query, correlation_id) {
        Ok(query) => query,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "list_holidays",
        StatusCode::OK,
        state.engine().list_holidays(query.year),
    )
}

async fn classify_date(
    State(state): State<AppState>,
    path: Result<Path<NaiveDate>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let date = match path_params(path, correlation_id) {
        Ok(date) => date,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "classify_date",
        StatusCode::OK,
        state.engine().classify_date(date),
    )
}

// ============================================================================
// Overtime
// ============================================================================

async fn classify_overtime(
    State(state): State<AppState>,
    payload: Result<Json<OvertimeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        source_key = %request.source.key(&request.employee_id),
        "Processing overtime classification"
    );

    let result = state.engine().classify_overtime(request);
    let status = match &result {
        Ok(outcome) if !outcome.created => StatusCode::OK,
        _ => StatusCode::CREATED,
    };
    respond(correlation_id, "classify_overtime", status, result)
}

async fn get_overtime(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match path_params(path, correlation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "get_overtime",
        StatusCode::OK,
        state.engine().overtime_entry(&id),
    )
}

async fn approve_overtime(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, request) = match (
        path_params(path, correlation_id),
        json_body(payload, correlation_id),
    ) {
        (Ok(id), Ok(request)) => (id, request),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    respond(
        correlation_id,
        "approve_overtime",
        StatusCode::OK,
        state.engine().approve_overtime(&id, &request.approver_id),
    )
}

async fn reject_overtime(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<RejectRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, request) = match (
        path_params(path, correlation_id),
        json_body(payload, correlation_id),
    ) {
        (Ok(id), Ok(request)) => (id, request),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    respond(
        correlation_id,
        "reject_overtime",
        StatusCode::OK,
        state
            .engine()
            .reject_overtime(&id, &request.approver_id, &request.comment),
    )
}

// ============================================================================
// Hour bank
// ============================================================================

async fn append_hour_bank_entry(
    State(state): State<AppState>,
    payload: Result<Json<NewHourBankEntry>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let input = match json_body(payload, correlation_id) {
        Ok(input) => input,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "append_hour_bank_entry",
        StatusCode::CREATED,
        state.engine().append_hour_bank_entry(input),
    )
}

async fn get_balance(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let employee_id = match path_params(path, correlation_id) {
        Ok(employee_id) => employee_id,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "get_balance",
        StatusCode::OK,
        state.engine().get_balance(&employee_id),
    )
}

async fn hour_bank_entries(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let employee_id = match path_params(path, correlation_id) {
        Ok(employee_id) => employee_id,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "hour_bank_entries",
        StatusCode::OK,
        state.engine().hour_bank_entries(&employee_id),
    )
}

async fn reconcile(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let employee_id = match path_params(path, correlation_id) {
        Ok(employee_id) => employee_id,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "reconcile",
        StatusCode::OK,
        state.engine().reconcile(&employee_id),
    )
}

async fn reconcile_all(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    respond(
        correlation_id,
        "reconcile_all",
        StatusCode::OK,
        state.engine().reconcile_all(),
    )
}

async fn take_compensatory_day(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<CompensatoryDayRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (employee_id, request) = match (
        path_params(path, correlation_id),
        json_body(payload, correlation_id),
    ) {
        (Ok(employee_id), Ok(request)) => (employee_id, request),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    respond(
        correlation_id,
        "take_compensatory_day",
        StatusCode::CREATED,
        state.engine().take_compensatory_day(
            &employee_id,
            request.date,
            request.minutes,
            &request.approver_id,
        ),
    )
}

// ============================================================================
// Vacations
// ============================================================================

async fn request_vacation(
    State(state): State<AppState>,
    payload: Result<Json<NewVacationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let input = match json_body(payload, correlation_id) {
        Ok(input) => input,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        employee_id = %input.employee_id,
        start_date = %input.start_date,
        end_date = %input.end_date,
        "Processing vacation request"
    );
    respond(
        correlation_id,
        "request_vacation",
        StatusCode::CREATED,
        state.engine().request_vacation(input),
    )
}

async fn get_vacation_request(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match path_params(path, correlation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "get_vacation_request",
        StatusCode::OK,
        state.engine().vacation_request(&id),
    )
}

async fn approve_vacation(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, request) = match (
        path_params(path, correlation_id),
        json_body(payload, correlation_id),
    ) {
        (Ok(id), Ok(request)) => (id, request),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    respond(
        correlation_id,
        "approve_vacation",
        StatusCode::OK,
        state.engine().approve_vacation(&id, &request.approver_id),
    )
}

async fn reject_vacation(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<RejectRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (id, request) = match (
        path_params(path, correlation_id),
        json_body(payload, correlation_id),
    ) {
        (Ok(id), Ok(request)) => (id, request),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    respond(
        correlation_id,
        "reject_vacation",
        StatusCode::OK,
        state
            .engine()
            .reject_vacation(&id, &request.approver_id, &request.comment),
    )
}

async fn vacation_requests(
    State(state): State<AppState>,
    path: Result<Path<(String, i32)>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (employee_id, year) = match path_params(path, correlation_id) {
        Ok(params) => params,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "vacation_requests",
        StatusCode::OK,
        state.engine().vacation_requests(&employee_id, year),
    )
}

async fn get_vacation_balance(
    State(state): State<AppState>,
    path: Result<Path<(String, i32)>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (employee_id, year) = match path_params(path, correlation_id) {
        Ok(params) => params,
        Err(response) => return response,
    };
    respond(
        correlation_id,
        "get_vacation_balance",
        StatusCode::OK,
        state.engine().get_vacation_balance(&employee_id, year),
    )
}

async fn set_vacation_entitlement(
    State(state): State<AppState>,
    path: Result<Path<(String, i32)>, PathRejection>,
    payload: Result<Json<EntitlementRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let ((employee_id, year), request) =
        match (path_params(path, correlation_id), json_body(payload, correlation_id)) {
            (Ok(params), Ok(request)) => (params, request),
            (Err(response), _) | (_, Err(response)) => return response,
        };
    respond(
        correlation_id,
        "set_vacation_entitlement",
        StatusCode::OK,
        state
            .engine()
            .set_vacation_entitlement(&employee_id, year, request.total_days),
    )
}

// ============================================================================
// Helpers
// ============================================================================

/// Wraps an engine result in the envelope and logs the outcome.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    operation: &'static str,
    status: StatusCode,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(data) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                status = status.as_u16(),
                "Request completed successfully"
            );
            (status, Json(ApiResponse::ok(data))).into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                "Request failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Unpacks a JSON body, turning rejections into enveloped 400 responses.
fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error).into_response())
}

fn path_params<T>(
    path: Result<Path<T>, PathRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    path.map(|Path(params)| params).map_err(|rejection| {
        let body_text = rejection.body_text();
        warn!(correlation_id = %correlation_id, error = %body_text, "Invalid path parameter");
        ApiErrorResponse::bad_request(ApiError::validation_error(body_text)).into_response()
    })
}

fn query_params<T>(
    query: Result<Query<T>, QueryRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    query.map(|Query(params)| params).map_err(|rejection| {
        let body_text = rejection.body_text();
        warn!(correlation_id = %correlation_id, error = %body_text, "Invalid query string");
        ApiErrorResponse::bad_request(ApiError::validation_error(body_text)).into_response()
    })
}
