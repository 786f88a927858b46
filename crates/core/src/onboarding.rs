//! Onboarding workflow definitions and rules.
//!
//! Defines the onboarding status and step enumerations, the static step
//! dependency table, and the pure state-machine checks enforced by the API
//! and repository layers. Steps follow a dependency graph rather than a
//! strict linear order: once `school_selection` is done the school branch
//! (registration, verification) and the role branch (role selection,
//! permissions) may complete in either order, and `dashboard_tour` requires
//! both branches.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Onboarding status
// ---------------------------------------------------------------------------

/// Status values for a user's onboarding record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    NotStarted,
    InProgress,
    Completed,
    Abandoned,
    RequiresApproval,
}

impl OnboardingStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "abandoned" => Ok(Self::Abandoned),
            "requires_approval" => Ok(Self::RequiresApproval),
            _ => Err(CoreError::Validation(format!(
                "Invalid onboarding status '{s}'. Must be one of: not_started, \
                 in_progress, completed, abandoned, requires_approval"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
            Self::RequiresApproval => "requires_approval",
        }
    }
}

// ---------------------------------------------------------------------------
// Onboarding steps
// ---------------------------------------------------------------------------

/// The ten steps of the onboarding workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    AccountCreation,
    EmailVerification,
    ProfileSetup,
    SchoolSelection,
    SchoolRegistration,
    SchoolVerification,
    RoleSelection,
    PermissionsSetup,
    DashboardTour,
    Completion,
}

/// Total number of steps in the workflow.
pub const TOTAL_STEPS: u8 = 10;

/// Canonical presentation order of the steps. Completion order is governed
/// by [`OnboardingStep::dependencies`], not by this list; the list fixes the
/// scan order for [`next_step`] and the order shown to clients.
pub const STEP_ORDER: [OnboardingStep; TOTAL_STEPS as usize] = [
    OnboardingStep::AccountCreation,
    OnboardingStep::EmailVerification,
    OnboardingStep::ProfileSetup,
    OnboardingStep::SchoolSelection,
    OnboardingStep::SchoolRegistration,
    OnboardingStep::SchoolVerification,
    OnboardingStep::RoleSelection,
    OnboardingStep::PermissionsSetup,
    OnboardingStep::DashboardTour,
    OnboardingStep::Completion,
];

impl OnboardingStep {
    /// Parse a step string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "account_creation" => Ok(Self::AccountCreation),
            "email_verification" => Ok(Self::EmailVerification),
            "profile_setup" => Ok(Self::ProfileSetup),
            "school_selection" => Ok(Self::SchoolSelection),
            "school_registration" => Ok(Self::SchoolRegistration),
            "school_verification" => Ok(Self::SchoolVerification),
            "role_selection" => Ok(Self::RoleSelection),
            "permissions_setup" => Ok(Self::PermissionsSetup),
            "dashboard_tour" => Ok(Self::DashboardTour),
            "completion" => Ok(Self::Completion),
            _ => Err(CoreError::Validation(format!(
                "Invalid onboarding step '{s}'. Must be one of: account_creation, \
                 email_verification, profile_setup, school_selection, \
                 school_registration, school_verification, role_selection, \
                 permissions_setup, dashboard_tour, completion"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountCreation => "account_creation",
            Self::EmailVerification => "email_verification",
            Self::ProfileSetup => "profile_setup",
            Self::SchoolSelection => "school_selection",
            Self::SchoolRegistration => "school_registration",
            Self::SchoolVerification => "school_verification",
            Self::RoleSelection => "role_selection",
            Self::PermissionsSetup => "permissions_setup",
            Self::DashboardTour => "dashboard_tour",
            Self::Completion => "completion",
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::AccountCreation => "Account Creation",
            Self::EmailVerification => "Email Verification",
            Self::ProfileSetup => "Profile Setup",
            Self::SchoolSelection => "School Selection",
            Self::SchoolRegistration => "School Registration",
            Self::SchoolVerification => "School Verification",
            Self::RoleSelection => "Role Selection",
            Self::PermissionsSetup => "Permissions Setup",
            Self::DashboardTour => "Dashboard Tour",
            Self::Completion => "Completion",
        }
    }

    /// Zero-based position of the step in [`STEP_ORDER`].
    pub fn position(self) -> usize {
        match self {
            Self::AccountCreation => 0,
            Self::EmailVerification => 1,
            Self::ProfileSetup => 2,
            Self::SchoolSelection => 3,
            Self::SchoolRegistration => 4,
            Self::SchoolVerification => 5,
            Self::RoleSelection => 6,
            Self::PermissionsSetup => 7,
            Self::DashboardTour => 8,
            Self::Completion => 9,
        }
    }

    /// Returns the steps that must be completed before `self` may complete.
    ///
    /// Dependency rules:
    /// - `account_creation`     -> (none)
    /// - `email_verification`   -> `account_creation`
    /// - `profile_setup`        -> `email_verification`
    /// - `school_selection`     -> `profile_setup`
    /// - `school_registration`  -> `school_selection`
    /// - `school_verification`  -> `school_registration`
    /// - `role_selection`       -> `school_selection`
    /// - `permissions_setup`    -> `role_selection`
    /// - `dashboard_tour`       -> `school_verification`, `permissions_setup`
    /// - `completion`           -> `dashboard_tour`
    pub fn dependencies(self) -> &'static [OnboardingStep] {
        match self {
            Self::AccountCreation => &[],
            Self::EmailVerification => &[Self::AccountCreation],
            Self::ProfileSetup => &[Self::EmailVerification],
            Self::SchoolSelection => &[Self::ProfileSetup],
            Self::SchoolRegistration => &[Self::SchoolSelection],
            Self::SchoolVerification => &[Self::SchoolRegistration],
            Self::RoleSelection => &[Self::SchoolSelection],
            Self::PermissionsSetup => &[Self::RoleSelection],
            Self::DashboardTour => &[Self::SchoolVerification, Self::PermissionsSetup],
            Self::Completion => &[Self::DashboardTour],
        }
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dependency rules
// ---------------------------------------------------------------------------

/// Check whether every dependency of `step` is present in `completed`.
pub fn can_proceed(step: OnboardingStep, completed: &[OnboardingStep]) -> bool {
    step.dependencies().iter().all(|dep| completed.contains(dep))
}

/// Returns the dependencies of `step` that are not yet in `completed`.
pub fn missing_dependencies(
    step: OnboardingStep,
    completed: &[OnboardingStep],
) -> Vec<OnboardingStep> {
    step.dependencies()
        .iter()
        .copied()
        .filter(|dep| !completed.contains(dep))
        .collect()
}

/// The step a user should be directed to after `current`.
///
/// Scans [`STEP_ORDER`] starting just after `current` and wrapping around,
/// and returns the first step that is not yet completed and whose
/// dependencies are all satisfied. The wrap matters when the branches were
/// worked out of canonical order: a user on `permissions_setup` who skipped
/// `school_registration` is sent back to it rather than forward.
///
/// `None` means every step is completed and the workflow can close out.
pub fn next_step(
    current: OnboardingStep,
    completed: &[OnboardingStep],
) -> Option<OnboardingStep> {
    let start = current.position();
    (1..=STEP_ORDER.len())
        .map(|offset| STEP_ORDER[(start + offset) % STEP_ORDER.len()])
        .find(|step| !completed.contains(step) && can_proceed(*step, completed))
}

/// Percentage of steps completed, rounded to a whole percent.
pub fn progress_percentage(completed_count: usize) -> u8 {
    ((completed_count as f64 / TOTAL_STEPS as f64) * 100.0).round() as u8
}

// ---------------------------------------------------------------------------
// Status gates
// ---------------------------------------------------------------------------

/// Check if onboarding can be started (must be not_started).
pub fn can_start(status: &str) -> Result<(), CoreError> {
    if status != OnboardingStatus::NotStarted.as_str() {
        return Err(CoreError::InvalidState(format!(
            "Cannot start onboarding with status '{status}'. \
             Only 'not_started' onboarding can be started."
        )));
    }
    Ok(())
}

/// Check if a step can be completed (must be in_progress).
pub fn can_complete_step(status: &str) -> Result<(), CoreError> {
    if status != OnboardingStatus::InProgress.as_str() {
        return Err(CoreError::InvalidState(format!(
            "Cannot complete a step with status '{status}'. \
             Steps can only be completed while onboarding is 'in_progress'."
        )));
    }
    Ok(())
}

/// Check if onboarding can be abandoned (anything but completed).
pub fn can_abandon(status: &str) -> Result<(), CoreError> {
    if status == OnboardingStatus::Completed.as_str() {
        return Err(CoreError::InvalidState(
            "Cannot abandon onboarding that has already been completed.".to_string(),
        ));
    }
    Ok(())
}

/// Check if onboarding can be approved (must be requires_approval).
pub fn can_approve(status: &str) -> Result<(), CoreError> {
    if status != OnboardingStatus::RequiresApproval.as_str() {
        return Err(CoreError::InvalidState(format!(
            "Cannot approve onboarding with status '{status}'. \
             Only 'requires_approval' onboarding can be approved."
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [OnboardingStatus; 5] = [
        OnboardingStatus::NotStarted,
        OnboardingStatus::InProgress,
        OnboardingStatus::Completed,
        OnboardingStatus::Abandoned,
        OnboardingStatus::RequiresApproval,
    ];

    // -- OnboardingStatus --

    #[test]
    fn status_from_str_valid() {
        assert_eq!(
            OnboardingStatus::from_str_db("not_started").unwrap(),
            OnboardingStatus::NotStarted
        );
        assert_eq!(
            OnboardingStatus::from_str_db("in_progress").unwrap(),
            OnboardingStatus::InProgress
        );
        assert_eq!(
            OnboardingStatus::from_str_db("completed").unwrap(),
            OnboardingStatus::Completed
        );
        assert_eq!(
            OnboardingStatus::from_str_db("abandoned").unwrap(),
            OnboardingStatus::Abandoned
        );
        assert_eq!(
            OnboardingStatus::from_str_db("requires_approval").unwrap(),
            OnboardingStatus::RequiresApproval
        );
    }

    #[test]
    fn status_from_str_invalid() {
        assert!(OnboardingStatus::from_str_db("invalid").is_err());
        assert!(OnboardingStatus::from_str_db("Completed").is_err());
        assert!(OnboardingStatus::from_str_db("").is_err());
    }

    #[test]
    fn status_as_str_roundtrip() {
        for status in ALL_STATUSES {
            let s = status.as_str();
            assert_eq!(OnboardingStatus::from_str_db(s).unwrap(), status);
        }
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let v = serde_json::to_value(OnboardingStatus::RequiresApproval).unwrap();
        assert_eq!(v, serde_json::json!("requires_approval"));
        let parsed: OnboardingStatus = serde_json::from_value(v).unwrap();
        assert_eq!(parsed, OnboardingStatus::RequiresApproval);
    }

    // -- OnboardingStep --

    #[test]
    fn step_from_str_valid() {
        assert_eq!(
            OnboardingStep::from_str_db("account_creation").unwrap(),
            OnboardingStep::AccountCreation
        );
        assert_eq!(
            OnboardingStep::from_str_db("school_verification").unwrap(),
            OnboardingStep::SchoolVerification
        );
        assert_eq!(
            OnboardingStep::from_str_db("completion").unwrap(),
            OnboardingStep::Completion
        );
    }

    #[test]
    fn step_from_str_invalid() {
        assert!(OnboardingStep::from_str_db("unknown_step").is_err());
        assert!(OnboardingStep::from_str_db("AccountCreation").is_err());
        assert!(OnboardingStep::from_str_db("").is_err());
    }

    #[test]
    fn step_as_str_roundtrip() {
        for step in STEP_ORDER {
            let s = step.as_str();
            assert_eq!(OnboardingStep::from_str_db(s).unwrap(), step);
        }
    }

    #[test]
    fn step_serde_matches_as_str() {
        for step in STEP_ORDER {
            let v = serde_json::to_value(step).unwrap();
            assert_eq!(v, serde_json::json!(step.as_str()));
        }
    }

    #[test]
    fn step_order_covers_every_step_once() {
        assert_eq!(STEP_ORDER.len(), TOTAL_STEPS as usize);
        for (i, step) in STEP_ORDER.iter().enumerate() {
            assert_eq!(step.position(), i);
        }
    }

    #[test]
    fn step_labels_are_nonempty() {
        for step in STEP_ORDER {
            assert!(!step.label().is_empty());
        }
    }

    // -- dependencies --

    #[test]
    fn account_creation_has_no_dependencies() {
        assert!(OnboardingStep::AccountCreation.dependencies().is_empty());
    }

    #[test]
    fn spine_steps_depend_on_their_predecessor() {
        assert_eq!(
            OnboardingStep::EmailVerification.dependencies(),
            &[OnboardingStep::AccountCreation]
        );
        assert_eq!(
            OnboardingStep::ProfileSetup.dependencies(),
            &[OnboardingStep::EmailVerification]
        );
        assert_eq!(
            OnboardingStep::SchoolSelection.dependencies(),
            &[OnboardingStep::ProfileSetup]
        );
    }

    #[test]
    fn both_branches_fork_from_school_selection() {
        assert_eq!(
            OnboardingStep::SchoolRegistration.dependencies(),
            &[OnboardingStep::SchoolSelection]
        );
        assert_eq!(
            OnboardingStep::RoleSelection.dependencies(),
            &[OnboardingStep::SchoolSelection]
        );
    }

    #[test]
    fn dashboard_tour_requires_both_branches() {
        assert_eq!(
            OnboardingStep::DashboardTour.dependencies(),
            &[
                OnboardingStep::SchoolVerification,
                OnboardingStep::PermissionsSetup
            ]
        );
    }

    #[test]
    fn completion_requires_dashboard_tour() {
        assert_eq!(
            OnboardingStep::Completion.dependencies(),
            &[OnboardingStep::DashboardTour]
        );
    }

    #[test]
    fn every_dependency_precedes_its_step_in_canonical_order() {
        for step in STEP_ORDER {
            for dep in step.dependencies() {
                assert!(
                    dep.position() < step.position(),
                    "{dep} should precede {step}"
                );
            }
        }
    }

    // -- can_proceed / missing_dependencies --

    #[test]
    fn first_step_can_proceed_with_nothing_completed() {
        assert!(can_proceed(OnboardingStep::AccountCreation, &[]));
    }

    #[test]
    fn step_is_blocked_until_its_dependency_completes() {
        assert!(!can_proceed(OnboardingStep::SchoolRegistration, &[]));
        assert!(can_proceed(
            OnboardingStep::SchoolRegistration,
            &[OnboardingStep::SchoolSelection]
        ));
    }

    #[test]
    fn role_branch_does_not_require_school_branch() {
        let completed = [
            OnboardingStep::AccountCreation,
            OnboardingStep::EmailVerification,
            OnboardingStep::ProfileSetup,
            OnboardingStep::SchoolSelection,
        ];
        assert!(can_proceed(OnboardingStep::RoleSelection, &completed));
        assert!(!completed.contains(&OnboardingStep::SchoolRegistration));
    }

    #[test]
    fn dashboard_tour_blocked_with_only_one_branch() {
        let school_branch_only = [
            OnboardingStep::SchoolSelection,
            OnboardingStep::SchoolRegistration,
            OnboardingStep::SchoolVerification,
        ];
        assert!(!can_proceed(OnboardingStep::DashboardTour, &school_branch_only));

        let both_branches = [
            OnboardingStep::SchoolVerification,
            OnboardingStep::PermissionsSetup,
        ];
        assert!(can_proceed(OnboardingStep::DashboardTour, &both_branches));
    }

    #[test]
    fn missing_dependencies_lists_unmet_steps() {
        let missing = missing_dependencies(
            OnboardingStep::DashboardTour,
            &[OnboardingStep::SchoolVerification],
        );
        assert_eq!(missing, vec![OnboardingStep::PermissionsSetup]);
    }

    #[test]
    fn missing_dependencies_empty_when_satisfied() {
        assert!(missing_dependencies(OnboardingStep::AccountCreation, &[]).is_empty());
        assert!(missing_dependencies(
            OnboardingStep::EmailVerification,
            &[OnboardingStep::AccountCreation]
        )
        .is_empty());
    }

    // -- next_step --

    #[test]
    fn fresh_record_is_directed_to_account_creation() {
        assert_eq!(
            next_step(OnboardingStep::AccountCreation, &[]),
            Some(OnboardingStep::AccountCreation)
        );
    }

    #[test]
    fn next_step_advances_down_the_spine() {
        assert_eq!(
            next_step(
                OnboardingStep::AccountCreation,
                &[OnboardingStep::AccountCreation]
            ),
            Some(OnboardingStep::EmailVerification)
        );
    }

    #[test]
    fn next_step_skips_completed_steps() {
        let completed = [
            OnboardingStep::AccountCreation,
            OnboardingStep::EmailVerification,
            OnboardingStep::ProfileSetup,
            OnboardingStep::SchoolSelection,
            OnboardingStep::SchoolRegistration,
            OnboardingStep::SchoolVerification,
        ];
        assert_eq!(
            next_step(OnboardingStep::SchoolRegistration, &completed),
            Some(OnboardingStep::RoleSelection)
        );
    }

    #[test]
    fn next_step_skips_ineligible_steps() {
        // School branch done, role branch untouched: the tour is not yet
        // reachable, so the scan lands on role_selection.
        let completed = [
            OnboardingStep::AccountCreation,
            OnboardingStep::EmailVerification,
            OnboardingStep::ProfileSetup,
            OnboardingStep::SchoolSelection,
            OnboardingStep::SchoolRegistration,
            OnboardingStep::SchoolVerification,
        ];
        assert_eq!(
            next_step(OnboardingStep::SchoolVerification, &completed),
            Some(OnboardingStep::RoleSelection)
        );
    }

    #[test]
    fn next_step_wraps_back_to_a_skipped_branch() {
        // Role branch finished first; the scan wraps past completion back
        // to school_registration.
        let completed = [
            OnboardingStep::AccountCreation,
            OnboardingStep::EmailVerification,
            OnboardingStep::ProfileSetup,
            OnboardingStep::SchoolSelection,
            OnboardingStep::RoleSelection,
            OnboardingStep::PermissionsSetup,
        ];
        assert_eq!(
            next_step(OnboardingStep::PermissionsSetup, &completed),
            Some(OnboardingStep::SchoolRegistration)
        );
    }

    #[test]
    fn next_step_none_when_everything_is_completed() {
        assert_eq!(next_step(OnboardingStep::Completion, &STEP_ORDER), None);
    }

    // -- progress_percentage --

    #[test]
    fn progress_is_zero_with_nothing_completed() {
        assert_eq!(progress_percentage(0), 0);
    }

    #[test]
    fn progress_scales_with_completed_count() {
        assert_eq!(progress_percentage(1), 10);
        assert_eq!(progress_percentage(3), 30);
        assert_eq!(progress_percentage(7), 70);
    }

    #[test]
    fn progress_is_full_when_all_completed() {
        assert_eq!(progress_percentage(TOTAL_STEPS as usize), 100);
    }

    // -- status gates --

    #[test]
    fn can_start_only_from_not_started() {
        assert!(can_start("not_started").is_ok());
        for status in ["in_progress", "completed", "abandoned", "requires_approval"] {
            assert!(can_start(status).is_err(), "start should fail from '{status}'");
        }
    }

    #[test]
    fn can_complete_step_only_while_in_progress() {
        assert!(can_complete_step("in_progress").is_ok());
        for status in ["not_started", "completed", "abandoned", "requires_approval"] {
            assert!(
                can_complete_step(status).is_err(),
                "step completion should fail from '{status}'"
            );
        }
    }

    #[test]
    fn can_abandon_everything_except_completed() {
        for status in ["not_started", "in_progress", "abandoned", "requires_approval"] {
            assert!(can_abandon(status).is_ok(), "abandon should pass from '{status}'");
        }
        assert!(can_abandon("completed").is_err());
    }

    #[test]
    fn can_approve_only_from_requires_approval() {
        assert!(can_approve("requires_approval").is_ok());
        for status in ["not_started", "in_progress", "completed", "abandoned"] {
            assert!(can_approve(status).is_err(), "approve should fail from '{status}'");
        }
    }
}
