//! MySqlStepStore - project step persistence on MySQL

use super::StepStore;
use crate::dtos::{CreateStepDTO, UpdateStepDTO};
use crate::entities::ProjectStep;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;

const STEP_COLUMNS: &str =
    "step_id, project_id, title, description, completed, position, created_at";

pub struct MySqlStepStore {
    connection_pool: MySqlPool,
}

impl MySqlStepStore {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    async fn fetch(&self, step_id: i32) -> Result<Option<ProjectStep>> {
        let step = sqlx::query_as::<_, ProjectStep>(&format!(
            "SELECT {STEP_COLUMNS} FROM project_steps WHERE step_id = ?"
        ))
        .bind(step_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(step)
    }
}

#[async_trait]
impl StepStore for MySqlStepStore {
    async fn create(&self, data: &CreateStepDTO) -> Result<ProjectStep> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO project_steps (project_id, title, description, completed, position, created_at) \
             VALUES (?, ?, ?, FALSE, ?, ?)",
        )
        .bind(data.project_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.position)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await
        .context("failed to insert step")?;

        let step_id = result.last_insert_id() as i32;

        Ok(ProjectStep {
            step_id,
            project_id: data.project_id,
            title: data.title.clone(),
            description: data.description.clone(),
            completed: false,
            position: data.position,
            created_at,
        })
    }

    async fn find_by_id(&self, step_id: i32) -> Result<Option<ProjectStep>> {
        self.fetch(step_id).await
    }

    async fn list_by_project(&self, project_id: i32) -> Result<Vec<ProjectStep>> {
        let steps = sqlx::query_as::<_, ProjectStep>(&format!(
            "SELECT {STEP_COLUMNS} FROM project_steps \
             WHERE project_id = ? ORDER BY position ASC, step_id ASC"
        ))
        .bind(project_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(steps)
    }

    async fn update(&self, step_id: i32, data: &UpdateStepDTO) -> Result<ProjectStep> {
        let current = self
            .fetch(step_id)
            .await?
            .ok_or_else(|| anyhow!("step {step_id} not found"))?;

        if data.title.is_none()
            && data.description.is_none()
            && data.completed.is_none()
            && data.position.is_none()
        {
            return Ok(current);
        }

        let mut query_builder = sqlx::QueryBuilder::new("UPDATE project_steps SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref title) = data.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }
        if let Some(ref description) = data.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }
        if let Some(completed) = data.completed {
            separated.push("completed = ");
            separated.push_bind_unseparated(completed);
        }
        if let Some(position) = data.position {
            separated.push("position = ");
            separated.push_bind_unseparated(position);
        }
        query_builder.push(" WHERE step_id = ");
        query_builder.push_bind(step_id);

        query_builder
            .build()
            .execute(&self.connection_pool)
            .await
            .context("failed to update step")?;

        self.fetch(step_id)
            .await?
            .ok_or_else(|| anyhow!("step {step_id} not found after update"))
    }

    async fn delete(&self, step_id: i32) -> Result<()> {
        sqlx::query("DELETE FROM project_steps WHERE step_id = ?")
            .bind(step_id)
            .execute(&self.connection_pool)
            .await
            .context("failed to delete step")?;

        Ok(())
    }
}
