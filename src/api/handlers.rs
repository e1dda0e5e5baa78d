//! HTTP request handlers for the crew roster API.
//!
//! Handlers parse input, call into the engines, and render results. They
//! hold no roster logic of their own.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::coverage::{CoverageQuery, coverage_report};
use crate::error::{RosterError, RosterResult};
use crate::models::{Assignment, DateRange};
use crate::overtime::{OvertimeReportQuery, employee_summary, overtime_report};
use crate::rotation::{RotationRequest, generate_for_pattern, generate_rotation, materialize};
use crate::swap::{SwapProposal, SwapWorkflow};

use super::request::{
    ApproveSwapRequest, CancelSwapRequest, CoverageRequest, DenySwapRequest, MaterializeRequest,
    OvertimeImportRequest, OvertimeParams,
};
use super::response::{
    ApiError, ApiErrorResponse, ImportResponse, MaterializeResponse, RotationResponse, SwapDetails,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/rotation/generate", post(generate_rotation_handler))
        .route("/rotation/materialize", post(materialize_handler))
        .route("/coverage", post(coverage_handler))
        .route("/swaps", post(create_swap_handler))
        .route("/swaps/:id", get(get_swap_handler))
        .route("/swaps/:id/approve", post(approve_swap_handler))
        .route("/swaps/:id/deny", post(deny_swap_handler))
        .route("/swaps/:id/cancel", post(cancel_swap_handler))
        .route("/overtime/import", post(import_overtime_handler))
        .route("/overtime/report", post(overtime_report_handler))
        .route("/overtime/:employee_id", get(employee_overtime_handler))
        .with_state(state)
}

/// The fill-forward cutoff for a materialization: the server date, or a
/// later date the caller asks for. Backdating is rejected.
fn materialize_cutoff(
    requested: Option<NaiveDate>,
    server_today: NaiveDate,
) -> RosterResult<NaiveDate> {
    match requested {
        Some(date) if date < server_today => Err(RosterError::validation(
            "today",
            format!(
                "cannot materialize from {}, which is before the server date {}",
                date, server_today
            ),
        )),
        Some(date) => Ok(date),
        None => Ok(server_today),
    }
}

/// Renders an engine result, logging the outcome against the correlation id.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    operation: &'static str,
    started: Instant,
    success: StatusCode,
    result: RosterResult<T>,
) -> Response {
    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                duration_us = started.elapsed().as_micros() as u64,
                "Request completed"
            );
            (success, Json(body)).into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                class = ?err.class(),
                error = %err,
                "Request failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Renders a JSON body rejection as a 400.
fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            ApiError::validation_error(body_text)
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}

/// Unwraps a JSON body or returns the rejection response.
macro_rules! body_or_reject {
    ($payload:expr, $correlation_id:expr) => {
        match $payload {
            Ok(Json(body)) => body,
            Err(rejection) => return json_rejection($correlation_id, rejection),
        }
    };
}

/// Handler for POST /rotation/generate.
async fn generate_rotation_handler(
    State(state): State<AppState>,
    payload: Result<Json<RotationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = body_or_reject!(payload, correlation_id);
    info!(correlation_id = %correlation_id, pattern = %request.pattern, "Generating rotation");

    let result = state.config().pattern(&request.pattern).and_then(|pattern| {
        let assignments = generate_rotation(state.config().config().patterns(), &request)?;
        Ok(RotationResponse {
            pattern: pattern.name().to_string(),
            cycle_length: pattern.cycle_length(),
            assignments,
        })
    });
    respond(correlation_id, "rotation.generate", started, StatusCode::OK, result)
}

/// Handler for POST /rotation/materialize.
async fn materialize_handler(
    State(state): State<AppState>,
    payload: Result<Json<MaterializeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = body_or_reject!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        pattern = %request.rotation.pattern,
        mode = ?request.mode,
        "Materializing rotation"
    );

    let result = materialize_cutoff(request.today, state.today()).and_then(|cutoff| {
        let assignments = generate_rotation(state.config().config().patterns(), &request.rotation)?;
        let report = materialize(state.store(), &assignments, cutoff, request.mode)?;
        Ok(MaterializeResponse {
            assignments: assignments.len(),
            report,
        })
    });
    respond(correlation_id, "rotation.materialize", started, StatusCode::OK, result)
}

/// Handler for POST /coverage.
async fn coverage_handler(
    State(state): State<AppState>,
    payload: Result<Json<CoverageRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = body_or_reject!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        start = %request.start_date,
        end = %request.end_date,
        "Computing coverage"
    );

    let result = DateRange::new(request.start_date, request.end_date).and_then(|range| {
        let rotation: Vec<Assignment> = match &request.rotation {
            Some(overlay) => {
                let pattern = state.config().pattern(&overlay.pattern)?;
                let crews: Vec<_> = pattern.crews().cloned().collect();
                generate_for_pattern(pattern, &crews, range, overlay.anchor_date)?
            }
            None => Vec::new(),
        };
        let query = CoverageQuery {
            range,
            crews: request.crews.clone(),
            today: request.today.unwrap_or_else(|| state.today()),
        };
        coverage_report(state.store(), state.config().config(), &query, &rotation)
    });
    respond(correlation_id, "coverage", started, StatusCode::OK, result)
}

/// Handler for POST /swaps.
async fn create_swap_handler(
    State(state): State<AppState>,
    payload: Result<Json<SwapProposal>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let proposal = body_or_reject!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        requester_id = %proposal.requester_id,
        "Creating swap request"
    );

    let workflow = SwapWorkflow::from_config(state.store(), state.config().config());
    let result = workflow.create(proposal, Utc::now());
    respond(correlation_id, "swap.create", started, StatusCode::CREATED, result)
}

/// Handler for GET /swaps/{id}.
async fn get_swap_handler(State(state): State<AppState>, Path(swap_id): Path<Uuid>) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let workflow = SwapWorkflow::from_config(state.store(), state.config().config());
    let result = workflow.get(swap_id).and_then(|swap| {
        Ok(SwapDetails {
            skill_warnings: workflow.review(swap_id)?,
            swap,
        })
    });
    respond(correlation_id, "swap.get", started, StatusCode::OK, result)
}

/// Handler for POST /swaps/{id}/approve.
async fn approve_swap_handler(
    State(state): State<AppState>,
    Path(swap_id): Path<Uuid>,
    payload: Result<Json<ApproveSwapRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = body_or_reject!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        swap_id = %swap_id,
        supervisor_id = %request.supervisor_id,
        "Approving swap"
    );

    let workflow = SwapWorkflow::from_config(state.store(), state.config().config());
    let result = workflow.approve(swap_id, &request.supervisor_id, Utc::now());
    respond(correlation_id, "swap.approve", started, StatusCode::OK, result)
}

/// Handler for POST /swaps/{id}/deny.
async fn deny_swap_handler(
    State(state): State<AppState>,
    Path(swap_id): Path<Uuid>,
    payload: Result<Json<DenySwapRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = body_or_reject!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        swap_id = %swap_id,
        supervisor_id = %request.supervisor_id,
        "Denying swap"
    );

    let workflow = SwapWorkflow::from_config(state.store(), state.config().config());
    let result = workflow.deny(swap_id, &request.supervisor_id, request.notes, Utc::now());
    respond(correlation_id, "swap.deny", started, StatusCode::OK, result)
}

/// Handler for POST /swaps/{id}/cancel.
async fn cancel_swap_handler(
    State(state): State<AppState>,
    Path(swap_id): Path<Uuid>,
    payload: Result<Json<CancelSwapRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = body_or_reject!(payload, correlation_id);

    let workflow = SwapWorkflow::from_config(state.store(), state.config().config());
    let result = workflow.cancel(swap_id, &request.employee_id, Utc::now());
    respond(correlation_id, "swap.cancel", started, StatusCode::OK, result)
}

/// Handler for POST /overtime/import.
async fn import_overtime_handler(
    State(state): State<AppState>,
    payload: Result<Json<OvertimeImportRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = body_or_reject!(payload, correlation_id);
    info!(correlation_id = %correlation_id, rows = request.rows.len(), "Importing overtime");

    let result = state
        .store()
        .import_overtime(request.rows)
        .map(|imported| ImportResponse { imported });
    respond(correlation_id, "overtime.import", started, StatusCode::OK, result)
}

/// Handler for GET /overtime/{employee_id}.
async fn employee_overtime_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    params: Result<Query<OvertimeParams>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Query string error");
            let error = ApiError::validation_error(rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    let result = employee_summary(
        state.store(),
        &state.config().settings().overtime,
        &employee_id,
        params.as_of_week,
        state.today(),
    );
    respond(correlation_id, "overtime.summary", started, StatusCode::OK, result)
}

/// Handler for POST /overtime/report.
async fn overtime_report_handler(
    State(state): State<AppState>,
    payload: Result<Json<OvertimeReportQuery>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let query = body_or_reject!(payload, correlation_id);

    let result = overtime_report(
        state.store(),
        &state.config().settings().overtime,
        &query,
        state.today(),
    );
    respond(correlation_id, "overtime.report", started, StatusCode::OK, result)
}
