//! API routes for neuroplayd.

use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use neuroplay_common::rpc::{HealthResponse, RegisterStudentRequest};
use neuroplay_common::{
    JobStatusResponse, PipelineError, StudentRewardState, SubmitAck, VERSION,
};
use std::sync::Arc;
use tracing::info;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Gameplay Routes
// ============================================================================

pub fn gameplay_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/gameplay/sync", post(sync_gameplay))
        .route("/v1/gameplay/session/:job_id/status", get(session_status))
}

/// Fast intake path: validate, enqueue, acknowledge. The final result is
/// delivered through the polling endpoint.
async fn sync_gameplay(
    State(state): State<AppStateArc>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<SubmitAck>), (StatusCode, String)> {
    match state.queue.submit(payload).await {
        Ok(ack) => {
            info!(job_id = %ack.job_id, "Gameplay submission accepted");
            Ok((StatusCode::ACCEPTED, Json(ack)))
        }
        Err(err @ PipelineError::InvalidPayload(_)) => {
            Err((StatusCode::BAD_REQUEST, err.to_string()))
        }
        Err(err) => Err((StatusCode::SERVICE_UNAVAILABLE, err.to_string())),
    }
}

async fn session_status(
    State(state): State<AppStateArc>,
    Path(job_id): Path<String>,
) -> (StatusCode, Json<JobStatusResponse>) {
    let response = state.queue.poll(&job_id).await;
    let code = match response {
        JobStatusResponse::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };
    (code, Json(response))
}

// ============================================================================
// Student Routes
// ============================================================================

pub fn student_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/students", post(register_student))
        .route("/v1/students/:student_id", get(get_student))
}

async fn register_student(
    State(state): State<AppStateArc>,
    Json(req): Json<RegisterStudentRequest>,
) -> Result<(StatusCode, Json<StudentRewardState>), (StatusCode, String)> {
    if req.student_id <= 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("student_id must be positive, got {}", req.student_id),
        ));
    }

    let stored = state
        .students
        .register(
            req.student_id,
            StudentRewardState {
                xp: req.xp,
                daily_streak: req.daily_streak,
                ..Default::default()
            },
        )
        .await;

    info!(student_id = req.student_id, "Student registered");
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn get_student(
    State(state): State<AppStateArc>,
    Path(student_id): Path<i64>,
) -> Result<Json<StudentRewardState>, (StatusCode, String)> {
    use crate::repos::StudentRepository;

    state
        .students
        .get_by_id(student_id)
        .await
        .map(Json)
        .map_err(|err| (StatusCode::NOT_FOUND, err.to_string()))
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        queue_depth: state.queue.depth().await,
        workers: state.workers,
    })
}
