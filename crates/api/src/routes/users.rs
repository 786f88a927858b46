//! Route definitions for user accounts.
//!
//! Mounted at `/users` by `api_routes()`.
//!
//! ```text
//! POST   /          create_user
//! GET    /          list_users
//! GET    /{id}      get_user
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/{id}", get(users::get_user))
}
