use crate::onboarding::OnboardingStep;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("User not found with id {user_id}")]
    UserNotFound { user_id: DbId },

    #[error("Onboarding record not found for user {user_id}")]
    RecordNotFound { user_id: DbId },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Prerequisites not met for step '{step}': missing {missing:?}")]
    PrerequisiteNotMet {
        step: OnboardingStep,
        missing: Vec<OnboardingStep>,
    },

    #[error("Validation failed: {0}")]
    Validation(String),
}
