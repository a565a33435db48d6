//! MySqlProjectStore - project persistence on MySQL

use super::ProjectStore;
use crate::dtos::{CreateProjectDTO, UpdateProjectDTO};
use crate::entities::Project;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;

pub struct MySqlProjectStore {
    connection_pool: MySqlPool,
}

impl MySqlProjectStore {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    async fn fetch(&self, project_id: i32) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT project_id, owner_id, name, description, created_at \
             FROM projects WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(project)
    }
}

#[async_trait]
impl ProjectStore for MySqlProjectStore {
    async fn create(&self, data: &CreateProjectDTO) -> Result<Project> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO projects (owner_id, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await
        .context("failed to insert project")?;

        let project_id = result.last_insert_id() as i32;

        Ok(Project {
            project_id,
            owner_id: data.owner_id,
            name: data.name.clone(),
            description: data.description.clone(),
            created_at,
        })
    }

    async fn find_by_id(&self, project_id: i32) -> Result<Option<Project>> {
        self.fetch(project_id).await
    }

    async fn update(&self, project_id: i32, data: &UpdateProjectDTO) -> Result<Project> {
        let current = self
            .fetch(project_id)
            .await?
            .ok_or_else(|| anyhow!("project {project_id} not found"))?;

        if data.name.is_none() && data.description.is_none() {
            return Ok(current);
        }

        let mut query_builder = sqlx::QueryBuilder::new("UPDATE projects SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref name) = data.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(ref description) = data.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }
        query_builder.push(" WHERE project_id = ");
        query_builder.push_bind(project_id);

        query_builder
            .build()
            .execute(&self.connection_pool)
            .await
            .context("failed to update project")?;

        self.fetch(project_id)
            .await?
            .ok_or_else(|| anyhow!("project {project_id} not found after update"))
    }

    async fn delete(&self, project_id: i32) -> Result<()> {
        sqlx::query("DELETE FROM projects WHERE project_id = ?")
            .bind(project_id)
            .execute(&self.connection_pool)
            .await
            .context("failed to delete project")?;

        Ok(())
    }
}
