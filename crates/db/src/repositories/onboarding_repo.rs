//! Repository for the `user_onboarding` table.
//!
//! Status transitions with a precondition are written as guarded updates
//! (the expected status sits in the `WHERE` clause) so concurrent requests
//! cannot both apply the same transition. Step completion is the one
//! multi-field read-modify-write; it runs inside a caller-owned transaction
//! via [`OnboardingRepo::find_by_user_for_update`] and
//! [`OnboardingRepo::apply_step_completion`].

use campus_core::onboarding::{OnboardingStatus, OnboardingStep};
use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::onboarding::{OnboardingRecord, OnboardingStats};

/// Column list for `user_onboarding` queries.
const COLUMNS: &str = "\
    id, user_id, status, current_step, completed_steps, step_data, \
    started_at, completed_at, last_step_at, abandoned_at, \
    approved_at, approved_by, notes, created_at, updated_at";

/// Provides persistence for onboarding workflow state.
pub struct OnboardingRepo;

impl OnboardingRepo {
    /// Get the onboarding record for a user, creating one with defaults if
    /// it does not exist yet (upsert pattern).
    ///
    /// Uses a no-op `DO UPDATE` to guarantee `RETURNING` always produces a
    /// row, so a repeated initialize returns the existing record unchanged.
    pub async fn get_or_create(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<OnboardingRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_onboarding (user_id) \
             VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = user_onboarding.user_id \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Find the onboarding record for a user.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<OnboardingRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_onboarding WHERE user_id = $1");
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the record and take a row lock within the caller's transaction.
    ///
    /// Holding the lock until commit keeps two concurrent step completions
    /// for the same user from clobbering each other's `completed_steps`.
    pub async fn find_by_user_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: DbId,
    ) -> Result<Option<OnboardingRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_onboarding WHERE user_id = $1 FOR UPDATE"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Guarded transition from `not_started` to `in_progress`, stamping
    /// `started_at`. Returns `None` if the row is missing or no longer in
    /// `not_started`.
    pub async fn start(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<OnboardingRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE user_onboarding \
             SET status = $2, started_at = NOW() \
             WHERE user_id = $1 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(user_id)
            .bind(OnboardingStatus::InProgress.as_str())
            .bind(OnboardingStatus::NotStarted.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Persist the outcome of a step completion computed by the caller
    /// while it holds the row lock from [`Self::find_by_user_for_update`].
    ///
    /// Writes the new `completed_steps` array and `step_data` object
    /// wholesale, moves `current_step` to the completed step, and stamps
    /// `last_step_at`. When `finished` is set the record also transitions
    /// to `completed` and stamps `completed_at`.
    pub async fn apply_step_completion(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: DbId,
        step: OnboardingStep,
        completed_steps: &serde_json::Value,
        step_data: &serde_json::Value,
        notes: Option<&str>,
        finished: bool,
    ) -> Result<OnboardingRecord, sqlx::Error> {
        let query = format!(
            "UPDATE user_onboarding \
             SET current_step = $2, \
                 completed_steps = $3, \
                 step_data = $4, \
                 last_step_at = NOW(), \
                 notes = COALESCE($5, notes), \
                 status = CASE WHEN $6 THEN $7 ELSE status END, \
                 completed_at = CASE WHEN $6 THEN NOW() ELSE completed_at END \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(user_id)
            .bind(step.as_str())
            .bind(completed_steps)
            .bind(step_data)
            .bind(notes)
            .bind(finished)
            .bind(OnboardingStatus::Completed.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Guarded transition to `abandoned` from any status except
    /// `completed`. `abandoned_at` keeps its first stamp on repeat calls;
    /// `notes` is only overwritten when a reason is supplied.
    pub async fn abandon(
        pool: &PgPool,
        user_id: DbId,
        reason: Option<&str>,
    ) -> Result<Option<OnboardingRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE user_onboarding \
             SET status = $2, \
                 abandoned_at = COALESCE(abandoned_at, NOW()), \
                 notes = COALESCE($3, notes) \
             WHERE user_id = $1 AND status <> $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(user_id)
            .bind(OnboardingStatus::Abandoned.as_str())
            .bind(reason)
            .bind(OnboardingStatus::Completed.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Flag a record for manual review. No status precondition: any
    /// record, including a completed one, can be sent back to the queue.
    pub async fn require_approval(
        pool: &PgPool,
        user_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<OnboardingRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE user_onboarding \
             SET status = $2, \
                 notes = COALESCE($3, notes) \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(user_id)
            .bind(OnboardingStatus::RequiresApproval.as_str())
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    /// Guarded transition from `requires_approval` to `completed`,
    /// stamping `approved_at` and recording the approving actor.
    pub async fn approve(
        pool: &PgPool,
        user_id: DbId,
        approver_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<OnboardingRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE user_onboarding \
             SET status = $2, \
                 approved_at = NOW(), \
                 approved_by = $3, \
                 notes = COALESCE($4, notes) \
             WHERE user_id = $1 AND status = $5 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(user_id)
            .bind(OnboardingStatus::Completed.as_str())
            .bind(approver_id)
            .bind(notes)
            .bind(OnboardingStatus::RequiresApproval.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Reset all onboarding progress to defaults for a user.
    pub async fn reset(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<OnboardingRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE user_onboarding \
             SET status = $2, \
                 current_step = $3, \
                 completed_steps = '[]'::jsonb, \
                 step_data = '{{}}'::jsonb, \
                 started_at = NULL, \
                 completed_at = NULL, \
                 last_step_at = NULL, \
                 abandoned_at = NULL, \
                 approved_at = NULL, \
                 approved_by = NULL, \
                 notes = NULL \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(user_id)
            .bind(OnboardingStatus::NotStarted.as_str())
            .bind(OnboardingStep::AccountCreation.as_str())
            .fetch_optional(pool)
            .await
    }

    /// All records awaiting approval, oldest created first.
    pub async fn list_pending_approval(
        pool: &PgPool,
    ) -> Result<Vec<OnboardingRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_onboarding \
             WHERE status = $1 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(OnboardingStatus::RequiresApproval.as_str())
            .fetch_all(pool)
            .await
    }

    /// Aggregate counts across all onboarding records.
    pub async fn stats(pool: &PgPool) -> Result<OnboardingStats, sqlx::Error> {
        let query = "\
            SELECT \
                COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE status = 'completed') AS completed, \
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress, \
                COUNT(*) FILTER (WHERE status = 'abandoned') AS abandoned, \
                COUNT(*) FILTER (WHERE status = 'requires_approval') AS requires_approval \
            FROM user_onboarding";
        sqlx::query_as::<_, OnboardingStats>(query)
            .fetch_one(pool)
            .await
    }
}
