//! MySqlMembershipStore - team membership persistence on MySQL

use super::MembershipStore;
use crate::entities::TeamMember;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const MEMBER_COLUMNS: &str = "project_id, user_id, member_email, added_at";

pub struct MySqlMembershipStore {
    connection_pool: MySqlPool,
}

impl MySqlMembershipStore {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

#[async_trait]
impl MembershipStore for MySqlMembershipStore {
    async fn insert(&self, member: &TeamMember) -> Result<bool> {
        // INSERT IGNORE + the (project_id, user_id) primary key: a
        // concurrent duplicate insert reports zero affected rows instead
        // of failing or duplicating.
        let result = sqlx::query(
            "INSERT IGNORE INTO team_members (project_id, user_id, member_email, added_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(member.project_id)
        .bind(member.user_id)
        .bind(&member.member_email)
        .bind(member.added_at)
        .execute(&self.connection_pool)
        .await
        .context("failed to insert team member")?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, project_id: i32, user_id: i32) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM team_members WHERE project_id = ? AND user_id = ?",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(found.is_some())
    }

    async fn find(&self, project_id: i32, user_id: i32) -> Result<Option<TeamMember>> {
        let member = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members WHERE project_id = ? AND user_id = ?"
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(member)
    }

    async fn list_by_project(&self, project_id: i32) -> Result<Vec<TeamMember>> {
        let members = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members \
             WHERE project_id = ? ORDER BY added_at ASC, user_id ASC"
        ))
        .bind(project_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(members)
    }

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<TeamMember>> {
        let members = sqlx::query_as::<_, TeamMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members \
             WHERE user_id = ? ORDER BY added_at ASC, project_id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(members)
    }

    async fn remove(&self, project_id: i32, user_id: i32) -> Result<()> {
        sqlx::query("DELETE FROM team_members WHERE project_id = ? AND user_id = ?")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await
            .context("failed to remove team member")?;

        Ok(())
    }
}
