//! Handlers for user accounts.
//!
//! Accounts here carry only the fields the onboarding workflow needs;
//! credentials and identity live elsewhere in the platform.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use campus_core::error::CoreError;
use campus_core::types::DbId;
use campus_db::models::user::CreateUser;
use campus_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /users
// ---------------------------------------------------------------------------

/// Create a user account. Username and email must be unique; violations
/// surface as 409.
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    if input.username.trim().is_empty() {
        return Err(AppError::BadRequest("username must not be empty".into()));
    }
    if input.email.trim().is_empty() {
        return Err(AppError::BadRequest("email must not be empty".into()));
    }

    let user = UserRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

// ---------------------------------------------------------------------------
// GET /users
// ---------------------------------------------------------------------------

/// List all users, most recently created first.
pub async fn list_users(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let users = UserRepo::list(&state.pool).await?;

    tracing::debug!(count = users.len(), "Listed users");

    Ok(Json(DataResponse { data: users }))
}

// ---------------------------------------------------------------------------
// GET /users/{id}
// ---------------------------------------------------------------------------

/// Get a single user by ID.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::UserNotFound { user_id }))?;

    Ok(Json(DataResponse { data: user }))
}
