//! Onboarding workflow orchestration.
//!
//! [`OnboardingWorkflow`] sits between the HTTP handlers and
//! [`OnboardingRepo`], enforcing status gates and the step dependency
//! graph before touching the database. Transition methods pre-check the
//! gate on a fresh read, then apply the repository's guarded update; a
//! guarded update that matches no row after the gate passed means a
//! concurrent request changed the status first.

use campus_core::error::CoreError;
use campus_core::onboarding;
use campus_core::types::DbId;
use campus_db::models::onboarding::{
    CompleteStepRequest, OnboardingProgress, OnboardingRecord, OnboardingStats,
};
use campus_db::repositories::{OnboardingRepo, UserRepo};
use campus_db::DbPool;

use crate::error::{AppError, AppResult};

/// Orchestrates the onboarding workflow on top of the repositories.
///
/// Cheap to clone; holds only a pool handle.
#[derive(Clone)]
pub struct OnboardingWorkflow {
    pool: DbPool,
}

impl OnboardingWorkflow {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the onboarding record for a user, or return the existing one.
    ///
    /// The user must exist; the record itself is created lazily here rather
    /// than at account creation time.
    pub async fn initialize(&self, user_id: DbId) -> AppResult<OnboardingRecord> {
        if !UserRepo::exists(&self.pool, user_id).await? {
            return Err(CoreError::UserNotFound { user_id }.into());
        }

        let record = OnboardingRepo::get_or_create(&self.pool, user_id).await?;

        tracing::info!(user_id, "Onboarding record initialized");

        Ok(record)
    }

    /// Begin onboarding: `not_started` to `in_progress`, stamping
    /// `started_at`.
    pub async fn start(&self, user_id: DbId) -> AppResult<OnboardingRecord> {
        let record = self.require_record(user_id).await?;
        onboarding::can_start(&record.status)?;

        let started = OnboardingRepo::start(&self.pool, user_id)
            .await?
            .ok_or_else(stale_status_error)?;

        tracing::info!(user_id, "Onboarding started");

        Ok(started)
    }

    /// Complete a single step for a user.
    ///
    /// Runs inside a transaction holding a row lock, so two requests
    /// completing steps for the same user serialize cleanly. The step's
    /// dependencies must all be in `completed_steps`; completing a step
    /// twice is a no-op for the array. When no eligible step remains
    /// afterwards the record transitions straight to `completed`.
    pub async fn complete_step(
        &self,
        user_id: DbId,
        input: CompleteStepRequest,
    ) -> AppResult<OnboardingRecord> {
        let mut tx = self.pool.begin().await?;

        let record = OnboardingRepo::find_by_user_for_update(&mut tx, user_id)
            .await?
            .ok_or(AppError::Core(CoreError::RecordNotFound { user_id }))?;

        onboarding::can_complete_step(&record.status)?;

        let step = input.step;
        let mut completed = record.completed_step_list();
        if !onboarding::can_proceed(step, &completed) {
            return Err(CoreError::PrerequisiteNotMet {
                step,
                missing: onboarding::missing_dependencies(step, &completed),
            }
            .into());
        }

        if !completed.contains(&step) {
            completed.push(step);
        }

        // Replace a corrupted non-object step_data column rather than fail
        // the write.
        let mut step_data = match record.step_data {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        if let Some(payload) = input.data {
            step_data.insert(step.as_str().to_string(), payload);
        }

        let next = onboarding::next_step(step, &completed);
        let finished = next.is_none();

        let updated = OnboardingRepo::apply_step_completion(
            &mut tx,
            user_id,
            step,
            &serde_json::to_value(&completed).unwrap_or_default(),
            &serde_json::Value::Object(step_data),
            input.notes.as_deref(),
            finished,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(user_id, step = %step, finished, "Onboarding step completed");

        Ok(updated)
    }

    /// Read-only progress projection for a user.
    pub async fn get_progress(&self, user_id: DbId) -> AppResult<OnboardingProgress> {
        let record = self.require_record(user_id).await?;

        tracing::debug!(user_id, "Fetched onboarding progress");

        Ok(record.progress()?)
    }

    /// Abandon onboarding. Allowed from any status except `completed`.
    pub async fn abandon(
        &self,
        user_id: DbId,
        reason: Option<String>,
    ) -> AppResult<OnboardingRecord> {
        let record = self.require_record(user_id).await?;
        onboarding::can_abandon(&record.status)?;

        let abandoned = OnboardingRepo::abandon(&self.pool, user_id, reason.as_deref())
            .await?
            .ok_or_else(stale_status_error)?;

        tracing::info!(user_id, "Onboarding abandoned");

        Ok(abandoned)
    }

    /// Flag a record for manual review. No status precondition.
    pub async fn require_approval(
        &self,
        user_id: DbId,
        notes: Option<String>,
    ) -> AppResult<OnboardingRecord> {
        let flagged = OnboardingRepo::require_approval(&self.pool, user_id, notes.as_deref())
            .await?
            .ok_or(AppError::Core(CoreError::RecordNotFound { user_id }))?;

        tracing::info!(user_id, "Onboarding flagged for approval");

        Ok(flagged)
    }

    /// Approve a flagged record: `requires_approval` to `completed`,
    /// recording who approved it and when.
    pub async fn approve(
        &self,
        user_id: DbId,
        approver_id: DbId,
        notes: Option<String>,
    ) -> AppResult<OnboardingRecord> {
        let record = self.require_record(user_id).await?;
        onboarding::can_approve(&record.status)?;

        let approved = OnboardingRepo::approve(&self.pool, user_id, approver_id, notes.as_deref())
            .await?
            .ok_or_else(stale_status_error)?;

        tracing::info!(user_id, approver_id, "Onboarding approved");

        Ok(approved)
    }

    /// Reset all onboarding progress for a user back to defaults.
    pub async fn reset(&self, user_id: DbId) -> AppResult<OnboardingRecord> {
        let reset = OnboardingRepo::reset(&self.pool, user_id)
            .await?
            .ok_or(AppError::Core(CoreError::RecordNotFound { user_id }))?;

        tracing::info!(user_id, "Onboarding reset");

        Ok(reset)
    }

    /// All records awaiting approval, oldest first.
    pub async fn list_pending_approval(&self) -> AppResult<Vec<OnboardingRecord>> {
        let records = OnboardingRepo::list_pending_approval(&self.pool).await?;

        tracing::debug!(count = records.len(), "Listed pending approvals");

        Ok(records)
    }

    /// Aggregate counts across all onboarding records.
    pub async fn stats(&self) -> AppResult<OnboardingStats> {
        let stats = OnboardingRepo::stats(&self.pool).await?;

        tracing::debug!(total = stats.total, "Fetched onboarding stats");

        Ok(stats)
    }

    /// Fetch the record for a user or fail with `RecordNotFound`.
    async fn require_record(&self, user_id: DbId) -> AppResult<OnboardingRecord> {
        OnboardingRepo::find_by_user(&self.pool, user_id)
            .await?
            .ok_or(AppError::Core(CoreError::RecordNotFound { user_id }))
    }
}

/// Error for a guarded update that matched no row after its gate passed:
/// a concurrent request won the race and changed the status first.
fn stale_status_error() -> AppError {
    AppError::Core(CoreError::InvalidState(
        "Onboarding status changed while the request was in flight".to_string(),
    ))
}
