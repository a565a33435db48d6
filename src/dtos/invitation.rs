//! Invitation DTOs

use crate::entities::{InvitationStatus, ProjectInvitation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Inbound batch invite request. Email syntax is deliberately not
/// validated here: the address is treated as a literal target and syntax
/// is a UI concern.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct InviteRequestDTO {
    #[validate(length(min = 1, max = 50))]
    pub emails: Vec<String>,
}

/// Inviter-side view of an invitation, as listed per project.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InvitationDTO {
    pub token: String,
    pub project_id: i32,
    pub email: String,
    pub invited_by: i32,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<ProjectInvitation> for InvitationDTO {
    fn from(value: ProjectInvitation) -> Self {
        Self {
            token: value.token,
            project_id: value.project_id,
            email: value.email,
            invited_by: value.invited_by,
            status: value.status,
            created_at: value.created_at,
            expires_at: value.expires_at,
        }
    }
}

/// Invitee-side view, enriched with project and inviter display data.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EnrichedInvitationDTO {
    pub token: String,
    pub project_id: i32,
    pub project_name: Option<String>,
    pub inviter_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
