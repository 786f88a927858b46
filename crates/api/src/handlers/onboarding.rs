//! Handlers for the user onboarding workflow.
//!
//! Every route delegates to [`OnboardingWorkflow`]; gate checks, the step
//! dependency graph, and transaction handling all live there. Handlers
//! only extract the request and shape the response.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use campus_core::types::DbId;
use campus_db::models::onboarding::{
    AbandonRequest, ApproveRequest, CompleteStepRequest, RequireApprovalRequest,
};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /users/{id}/onboarding
// ---------------------------------------------------------------------------

/// Create the onboarding record for a user, or return the existing one.
/// Safe to call repeatedly.
pub async fn initialize_onboarding(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = state.workflow.initialize(user_id).await?;

    Ok(Json(DataResponse { data: record }))
}

// ---------------------------------------------------------------------------
// POST /users/{id}/onboarding/start
// ---------------------------------------------------------------------------

/// Begin the workflow for a user whose record is still `not_started`.
pub async fn start_onboarding(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = state.workflow.start(user_id).await?;

    Ok(Json(DataResponse { data: record }))
}

// ---------------------------------------------------------------------------
// POST /users/{id}/onboarding/complete-step
// ---------------------------------------------------------------------------

/// Complete a single step, optionally attaching a payload and notes.
pub async fn complete_step(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<CompleteStepRequest>,
) -> AppResult<impl IntoResponse> {
    let record = state.workflow.complete_step(user_id, input).await?;

    Ok(Json(DataResponse { data: record }))
}

// ---------------------------------------------------------------------------
// GET /users/{id}/onboarding/progress
// ---------------------------------------------------------------------------

/// Read-only progress projection: completed steps, percentage, and the
/// next eligible step.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let progress = state.workflow.get_progress(user_id).await?;

    Ok(Json(DataResponse { data: progress }))
}

// ---------------------------------------------------------------------------
// POST /users/{id}/onboarding/abandon
// ---------------------------------------------------------------------------

/// Abandon the workflow. The body is optional; a reason, when given, is
/// stored in the record's notes.
pub async fn abandon_onboarding(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    body: Option<Json<AbandonRequest>>,
) -> AppResult<impl IntoResponse> {
    let reason = body.and_then(|Json(b)| b.reason);
    let record = state.workflow.abandon(user_id, reason).await?;

    Ok(Json(DataResponse { data: record }))
}

// ---------------------------------------------------------------------------
// POST /users/{id}/onboarding/require-approval
// ---------------------------------------------------------------------------

/// Flag the record for manual review by an administrator.
pub async fn require_approval(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    body: Option<Json<RequireApprovalRequest>>,
) -> AppResult<impl IntoResponse> {
    let notes = body.and_then(|Json(b)| b.notes);
    let record = state.workflow.require_approval(user_id, notes).await?;

    Ok(Json(DataResponse { data: record }))
}

// ---------------------------------------------------------------------------
// POST /users/{id}/onboarding/approve
// ---------------------------------------------------------------------------

/// Approve a flagged record, recording the approving administrator.
pub async fn approve_onboarding(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<ApproveRequest>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .workflow
        .approve(user_id, input.approver_id, input.notes)
        .await?;

    Ok(Json(DataResponse { data: record }))
}

// ---------------------------------------------------------------------------
// POST /users/{id}/onboarding/reset
// ---------------------------------------------------------------------------

/// Reset all onboarding progress for a user back to defaults.
pub async fn reset_onboarding(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = state.workflow.reset(user_id).await?;

    Ok(Json(DataResponse { data: record }))
}

// ---------------------------------------------------------------------------
// GET /admin/onboarding/pending-approvals
// ---------------------------------------------------------------------------

/// All records awaiting approval, oldest first.
pub async fn list_pending_approvals(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let records = state.workflow.list_pending_approval().await?;

    Ok(Json(DataResponse { data: records }))
}

// ---------------------------------------------------------------------------
// GET /admin/onboarding/stats
// ---------------------------------------------------------------------------

/// Aggregate record counts by status.
pub async fn get_onboarding_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = state.workflow.stats().await?;

    Ok(Json(DataResponse { data: stats }))
}
