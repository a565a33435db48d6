//! ProjectInvitation entity - a time-bounded offer to join a project

use super::enums::InvitationStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long an invitation stays acceptable after creation.
pub const INVITATION_TTL_DAYS: i64 = 7;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ProjectInvitation {
    /// Opaque unguessable token, primary lookup key and sole credential
    /// for acceptance.
    pub token: String,
    pub project_id: i32,
    /// Target address, case-preserved for display; matching is always
    /// done on the lowercased form.
    pub email: String,
    pub invited_by: i32,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_by: Option<i32>,
}

impl ProjectInvitation {
    /// Build a fresh pending invitation with a random token and an expiry
    /// of `INVITATION_TTL_DAYS` from `now`.
    pub fn new_pending(project_id: i32, email: &str, invited_by: i32, now: DateTime<Utc>) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            project_id,
            email: email.to_owned(),
            invited_by,
            status: InvitationStatus::Pending,
            created_at: now,
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            accepted_at: None,
            accepted_by: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
