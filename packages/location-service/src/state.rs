use std::sync::Arc;

use crate::{
    config::Config,
    libraries::radius::{RadiusPolicy, RadiusPolicyError},
    services::{
        issues::{InMemoryIssueStore, IssueStore},
        notifications::NotificationHub,
    },
};

/// Shared state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub radius_policy: RadiusPolicy,
    pub issues: Arc<dyn IssueStore>,
    pub notifications: NotificationHub,
}

impl AppState {
    /// Build state backed by the in-memory issue store
    pub fn new(config: Config) -> Result<Self, RadiusPolicyError> {
        Self::with_store(config, Arc::new(InMemoryIssueStore::new()))
    }

    pub fn with_store(
        config: Config,
        issues: Arc<dyn IssueStore>,
    ) -> Result<Self, RadiusPolicyError> {
        let radius_policy = config.radius_policy()?;

        Ok(Self {
            config,
            radius_policy,
            issues,
            notifications: NotificationHub::new(),
        })
    }
}
