//! ProjectStep DTOs

use crate::entities::ProjectStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StepDTO {
    pub step_id: i32,
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ProjectStep> for StepDTO {
    fn from(value: ProjectStep) -> Self {
        Self {
            step_id: value.step_id,
            project_id: value.project_id,
            title: value.title,
            description: value.description,
            completed: value.completed,
            position: value.position,
            created_at: value.created_at,
        }
    }
}

/// Store-level DTO for creating a step (without step_id).
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateStepDTO {
    pub project_id: i32,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub position: i32,
}

/// Partial update: only `Some(_)` fields are modified.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateStepDTO {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub position: Option<i32>,
}
