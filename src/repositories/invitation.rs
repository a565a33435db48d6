//! MySqlInvitationStore - project invitation persistence on MySQL

use super::InvitationStore;
use crate::entities::{InvitationStatus, ProjectInvitation};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

const INVITATION_COLUMNS: &str = "token, project_id, email, invited_by, status, \
     created_at, expires_at, accepted_at, accepted_by";

pub struct MySqlInvitationStore {
    connection_pool: MySqlPool,
}

impl MySqlInvitationStore {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

#[async_trait]
impl InvitationStore for MySqlInvitationStore {
    async fn create(&self, invitation: &ProjectInvitation) -> Result<()> {
        sqlx::query(
            "INSERT INTO project_invitations \
             (token, project_id, email, invited_by, status, created_at, expires_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&invitation.token)
        .bind(invitation.project_id)
        .bind(&invitation.email)
        .bind(invitation.invited_by)
        .bind(invitation.status.clone())
        .bind(invitation.created_at)
        .bind(invitation.expires_at)
        .execute(&self.connection_pool)
        .await
        .context("failed to insert invitation")?;

        Ok(())
    }

    async fn find_pending_by_token(&self, token: &str) -> Result<Option<ProjectInvitation>> {
        let invitation = sqlx::query_as::<_, ProjectInvitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM project_invitations \
             WHERE token = ? AND status = 'PENDING'"
        ))
        .bind(token)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(invitation)
    }

    async fn has_pending(&self, project_id: i32, email: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM project_invitations \
             WHERE project_id = ? AND LOWER(email) = ? AND status = 'PENDING' LIMIT 1",
        )
        .bind(project_id)
        .bind(email.to_lowercase())
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(found.is_some())
    }

    async fn list_pending_by_project(&self, project_id: i32) -> Result<Vec<ProjectInvitation>> {
        let invitations = sqlx::query_as::<_, ProjectInvitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM project_invitations \
             WHERE project_id = ? AND status = 'PENDING' ORDER BY created_at ASC"
        ))
        .bind(project_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(invitations)
    }

    async fn list_pending_by_email(&self, email: &str) -> Result<Vec<ProjectInvitation>> {
        let invitations = sqlx::query_as::<_, ProjectInvitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM project_invitations \
             WHERE LOWER(email) = ? AND status = 'PENDING' ORDER BY created_at ASC"
        ))
        .bind(email.to_lowercase())
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(invitations)
    }

    async fn mark_accepted(
        &self,
        token: &str,
        accepted_by: i32,
        accepted_at: DateTime<Utc>,
    ) -> Result<()> {
        // The WHERE clause keeps the transition one-way: an already
        // accepted row is simply not matched.
        sqlx::query(
            "UPDATE project_invitations \
             SET status = ?, accepted_at = ?, accepted_by = ? \
             WHERE token = ? AND status = 'PENDING'",
        )
        .bind(InvitationStatus::Accepted)
        .bind(accepted_at)
        .bind(accepted_by)
        .bind(token)
        .execute(&self.connection_pool)
        .await
        .context("failed to mark invitation accepted")?;

        Ok(())
    }
}
