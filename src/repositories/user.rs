//! MySqlUserStore - user persistence on MySQL

use super::UserStore;
use crate::dtos::CreateUserDTO;
use crate::entities::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;

pub struct MySqlUserStore {
    connection_pool: MySqlPool,
}

impl MySqlUserStore {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

#[async_trait]
impl UserStore for MySqlUserStore {
    async fn create(&self, data: &CreateUserDTO) -> Result<User> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (external_id, username, email, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&data.external_id)
        .bind(&data.username)
        .bind(&data.email)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await
        .context("failed to insert user")?;

        let user_id = result.last_insert_id() as i32;

        Ok(User {
            user_id,
            external_id: data.external_id.clone(),
            username: data.username.clone(),
            email: data.email.clone(),
            created_at,
        })
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, external_id, username, email, created_at \
             FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, external_id, username, email, created_at \
             FROM users WHERE external_id = ?",
        )
        .bind(external_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        // Stored emails are lowercased on insert, so plain equality on the
        // normalized input is a case-insensitive match.
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, external_id, username, email, created_at \
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    async fn update_username(&self, user_id: i32, username: &str) -> Result<()> {
        sqlx::query("UPDATE users SET username = ? WHERE user_id = ?")
            .bind(username)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await
            .context("failed to update username")?;

        Ok(())
    }
}
