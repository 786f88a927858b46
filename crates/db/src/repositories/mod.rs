//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run
//! inside a caller-owned transaction take the transaction instead.

pub mod onboarding_repo;
pub mod user_repo;

pub use onboarding_repo::OnboardingRepo;
pub use user_repo::UserRepo;
