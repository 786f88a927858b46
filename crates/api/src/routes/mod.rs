pub mod health;
pub mod onboarding;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                                    list, create
/// /users/{id}                               get
///
/// /users/{id}/onboarding                    initialize record (POST)
/// /users/{id}/onboarding/start              begin workflow (POST)
/// /users/{id}/onboarding/complete-step      complete a step (POST)
/// /users/{id}/onboarding/progress           progress projection (GET)
/// /users/{id}/onboarding/abandon            abandon workflow (POST)
/// /users/{id}/onboarding/require-approval   flag for manual review (POST)
/// /users/{id}/onboarding/approve            approve flagged record (POST)
/// /users/{id}/onboarding/reset              reset to defaults (POST)
///
/// /admin/onboarding/pending-approvals       approval queue (GET)
/// /admin/onboarding/stats                   aggregate counts (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // User accounts.
        .nest("/users", users::router())
        // Per-user onboarding workflow.
        .nest("/users/{id}/onboarding", onboarding::router())
        // Admin views over all onboarding records.
        .nest("/admin/onboarding", onboarding::admin_router())
}
