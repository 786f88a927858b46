//! Request handlers.
//!
//! Handlers stay thin: they extract the request, delegate to
//! [`OnboardingWorkflow`](crate::workflow::OnboardingWorkflow) or a
//! repository in `campus_db`, and wrap the result in the standard
//! response envelope. Errors map to HTTP via [`AppError`](crate::error::AppError).

pub mod onboarding;
pub mod users;
