//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs for the operations on that entity
//! - Read-only projections derived from the entity

pub mod onboarding;
pub mod user;
