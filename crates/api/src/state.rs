use std::sync::Arc;

use crate::config::ServerConfig;
use crate::workflow::OnboardingWorkflow;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: campus_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Onboarding workflow service.
    pub workflow: OnboardingWorkflow,
}

impl AppState {
    /// Assemble application state from a pool and configuration.
    pub fn new(pool: campus_db::DbPool, config: ServerConfig) -> Self {
        Self {
            workflow: OnboardingWorkflow::new(pool.clone()),
            pool,
            config: Arc::new(config),
        }
    }
}
