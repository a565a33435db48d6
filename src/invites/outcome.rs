//! Outcomes of the invitation workflow
//!
//! Expected non-success modes (already a member, duplicate invitation,
//! delivery failure) are data on the outcome, not errors: a batch of
//! invites reports one outcome per address and never aborts as a whole.

use serde::{Deserialize, Serialize};

/// Why an invite request changed nothing. Both are idempotency signals,
/// not failures of the caller or the system.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InviteSkipReason {
    AlreadyMember,
    DuplicateInvite,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InviteOutcome {
    /// The address as submitted (trimmed, case preserved).
    pub email: String,
    pub success: bool,
    /// True when a pending invitation was created, false when the user was
    /// added to the team directly.
    pub is_invitation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<InviteSkipReason>,
    /// Set when the invitation was persisted but its email could not be
    /// delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Generic failure message for an address whose processing failed
    /// unexpectedly; other addresses in the batch are unaffected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InviteOutcome {
    /// Existing user added straight to the team.
    pub(crate) fn added(email: &str) -> Self {
        Self {
            email: email.to_owned(),
            success: true,
            is_invitation: false,
            reason: None,
            warning: None,
            error: None,
        }
    }

    /// Pending invitation persisted; `warning` carries a delivery failure.
    pub(crate) fn invited(email: &str, warning: Option<String>) -> Self {
        Self {
            email: email.to_owned(),
            success: true,
            is_invitation: true,
            reason: None,
            warning,
            error: None,
        }
    }

    pub(crate) fn skipped(email: &str, reason: InviteSkipReason) -> Self {
        Self {
            email: email.to_owned(),
            success: false,
            is_invitation: false,
            reason: Some(reason),
            warning: None,
            error: None,
        }
    }

    pub(crate) fn failed(email: &str, error: &str) -> Self {
        Self {
            email: email.to_owned(),
            success: false,
            is_invitation: false,
            reason: None,
            warning: None,
            error: Some(error.to_owned()),
        }
    }
}

/// Result of a successful acceptance; carries the project so the caller
/// can navigate there.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AcceptedInvitation {
    pub project_id: i32,
}
