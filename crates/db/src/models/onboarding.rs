//! Onboarding entity model, projections, and request DTOs.

use campus_core::error::CoreError;
use campus_core::onboarding::{self, OnboardingStatus, OnboardingStep, TOTAL_STEPS};
use campus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `user_onboarding` table.
///
/// `status` and `current_step` are stored as TEXT, `completed_steps` and
/// `step_data` as JSONB. The accessor methods below decode them through the
/// `campus_core` step/status definitions; rows only ever receive values that
/// round-trip through those definitions.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingRecord {
    pub id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub current_step: String,
    /// JSONB array of completed step names, in completion order.
    pub completed_steps: serde_json::Value,
    /// JSONB object keyed by step name; present only for steps that
    /// received a payload.
    pub step_data: serde_json::Value,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub last_step_at: Option<Timestamp>,
    pub abandoned_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub approved_by: Option<DbId>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OnboardingRecord {
    pub fn is_completed(&self) -> bool {
        self.status == OnboardingStatus::Completed.as_str()
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == OnboardingStatus::InProgress.as_str()
    }

    pub fn is_abandoned(&self) -> bool {
        self.status == OnboardingStatus::Abandoned.as_str()
    }

    pub fn is_pending_approval(&self) -> bool {
        self.status == OnboardingStatus::RequiresApproval.as_str()
    }

    /// Parse the current step column.
    pub fn current(&self) -> Result<OnboardingStep, CoreError> {
        OnboardingStep::from_str_db(&self.current_step)
    }

    /// Decode the completed-steps array. Entries that are not known step
    /// names are skipped rather than failing the whole read.
    pub fn completed_step_list(&self) -> Vec<OnboardingStep> {
        self.completed_steps
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(|s| OnboardingStep::from_str_db(s).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set-membership check against the raw JSONB array.
    pub fn has_completed_step(&self, step: OnboardingStep) -> bool {
        self.completed_steps
            .as_array()
            .map(|entries| entries.iter().any(|v| v.as_str() == Some(step.as_str())))
            .unwrap_or(false)
    }

    /// True iff every dependency of `step` has been completed.
    pub fn can_proceed_to(&self, step: OnboardingStep) -> bool {
        onboarding::can_proceed(step, &self.completed_step_list())
    }

    /// The next uncompleted step whose dependencies are satisfied, or
    /// `None` when onboarding is finished.
    pub fn next_step(&self) -> Result<Option<OnboardingStep>, CoreError> {
        Ok(onboarding::next_step(
            self.current()?,
            &self.completed_step_list(),
        ))
    }

    /// Percentage of steps completed, rounded to a whole percent.
    pub fn progress_percentage(&self) -> u8 {
        onboarding::progress_percentage(self.completed_step_list().len())
    }

    /// Payload stored for `step`, if any.
    pub fn step_data_for(&self, step: OnboardingStep) -> Option<&serde_json::Value> {
        self.step_data.get(step.as_str())
    }

    /// Build the read-only progress projection for this record.
    pub fn progress(&self) -> Result<OnboardingProgress, CoreError> {
        let current = self.current()?;
        let completed = self.completed_step_list();
        Ok(OnboardingProgress {
            id: self.id,
            user_id: self.user_id,
            status: self.status.clone(),
            current_step: current,
            progress_percentage: onboarding::progress_percentage(completed.len()),
            total_steps: TOTAL_STEPS,
            can_proceed: onboarding::can_proceed(current, &completed),
            next_step: onboarding::next_step(current, &completed),
            completed_steps: completed,
            started_at: self.started_at,
            completed_at: self.completed_at,
            last_step_at: self.last_step_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// Read-only view returned by the progress endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub current_step: OnboardingStep,
    pub completed_steps: Vec<OnboardingStep>,
    pub progress_percentage: u8,
    pub total_steps: u8,
    /// Whether the dependencies of `current_step` are satisfied.
    pub can_proceed: bool,
    pub next_step: Option<OnboardingStep>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub last_step_at: Option<Timestamp>,
}

/// Aggregate onboarding counts across all users.
///
/// `not_started` records are counted in `total` but carry no dedicated
/// column here; the published aggregate has always reported the four
/// post-start statuses only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingStats {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub abandoned: i64,
    pub requires_approval: i64,
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for completing a step.
#[derive(Debug, Deserialize)]
pub struct CompleteStepRequest {
    pub step: OnboardingStep,
    /// Arbitrary payload stored under the step's key in `step_data`.
    pub data: Option<serde_json::Value>,
    pub notes: Option<String>,
}

/// Request body for abandoning onboarding.
#[derive(Debug, Deserialize)]
pub struct AbandonRequest {
    pub reason: Option<String>,
}

/// Request body for flagging onboarding for manual review.
#[derive(Debug, Deserialize)]
pub struct RequireApprovalRequest {
    pub notes: Option<String>,
}

/// Request body for approving a flagged record.
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub approver_id: DbId,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
