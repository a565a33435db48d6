//! Email module - invitation notification dispatch
//!
//! Persistence of an invitation and delivery of its email are
//! intentionally decoupled: the orchestrator persists first, then asks a
//! `NotificationDispatcher` to deliver, and a delivery failure only
//! surfaces as a warning on an otherwise successful outcome.

mod smtp;
mod templates;

pub use smtp::SmtpDispatcher;
pub use templates::InviteEmailContent;

use crate::core::config::Config;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Email dispatch error
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("failed to send email: {0}")]
    SendFailed(String),

    #[error("invalid email configuration: {0}")]
    InvalidConfig(String),
}

/// Everything the dispatcher needs to deliver one invitation email.
#[derive(Debug, Clone)]
pub struct InviteNotification {
    /// Target address, case-preserved as submitted.
    pub to_address: String,
    pub project_name: String,
    pub inviter_name: String,
    pub token: String,
    pub project_id: i32,
}

/// Acceptance link embedded in dispatched email. The shape is part of the
/// public contract (emailed links must keep working), so it is built in
/// exactly one place.
pub fn invite_link(base_url: &str, token: &str, project_id: i32) -> String {
    format!("{base_url}/invite/accept?token={token}&project={project_id}")
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, invite: &InviteNotification) -> Result<(), EmailError>;
}

/// Fallback dispatcher used when no SMTP transport is configured: the
/// acceptance link is logged so local setups can still complete the flow.
pub struct NoopDispatcher {
    base_url: String,
}

impl NoopDispatcher {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

#[async_trait]
impl NotificationDispatcher for NoopDispatcher {
    async fn send(&self, invite: &InviteNotification) -> Result<(), EmailError> {
        info!(
            to = %invite.to_address,
            link = %invite_link(&self.base_url, &invite.token, invite.project_id),
            "email dispatch disabled, invitation link logged instead"
        );
        Ok(())
    }
}

/// Builds the dispatcher configured for this process: SMTP when configured,
/// the logging fallback otherwise.
pub fn create_dispatcher(config: &Config) -> Result<Arc<dyn NotificationDispatcher>, EmailError> {
    match &config.smtp {
        Some(smtp_config) => Ok(Arc::new(SmtpDispatcher::new(smtp_config, config)?)),
        None => Ok(Arc::new(NoopDispatcher::new(config.base_url.clone()))),
    }
}
