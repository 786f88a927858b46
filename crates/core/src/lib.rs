//! Pure domain logic for the campus platform backend.
//!
//! This crate holds types and rules only: no I/O, no database access, no
//! async. The API and repository layers depend on it for the onboarding
//! step/status definitions and the state-machine checks they enforce.

pub mod error;
pub mod onboarding;
pub mod types;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
