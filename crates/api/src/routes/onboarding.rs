//! Route definitions for the onboarding workflow.
//!
//! The per-user router is mounted at `/users/{id}/onboarding`, the admin
//! router at `/admin/onboarding`, both by `api_routes()`.
//!
//! ```text
//! POST   /                      initialize_onboarding
//! POST   /start                 start_onboarding
//! POST   /complete-step         complete_step
//! GET    /progress              get_progress
//! POST   /abandon               abandon_onboarding
//! POST   /require-approval      require_approval
//! POST   /approve               approve_onboarding
//! POST   /reset                 reset_onboarding
//!
//! GET    /pending-approvals     list_pending_approvals
//! GET    /stats                 get_onboarding_stats
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Per-user workflow routes -- mounted at `/users/{id}/onboarding`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(onboarding::initialize_onboarding))
        .route("/start", post(onboarding::start_onboarding))
        .route("/complete-step", post(onboarding::complete_step))
        .route("/progress", get(onboarding::get_progress))
        .route("/abandon", post(onboarding::abandon_onboarding))
        .route("/require-approval", post(onboarding::require_approval))
        .route("/approve", post(onboarding::approve_onboarding))
        .route("/reset", post(onboarding::reset_onboarding))
}

/// Admin routes -- mounted at `/admin/onboarding`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/pending-approvals", get(onboarding::list_pending_approvals))
        .route("/stats", get(onboarding::get_onboarding_stats))
}
