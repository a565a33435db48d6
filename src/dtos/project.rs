//! Project DTOs

use crate::entities::Project;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProjectDTO {
    pub project_id: i32,
    pub owner_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectDTO {
    fn from(value: Project) -> Self {
        Self {
            project_id: value.project_id,
            owner_id: value.owner_id,
            name: value.name,
            description: value.description,
            created_at: value.created_at,
        }
    }
}

/// Store-level DTO for creating a project (without project_id).
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateProjectDTO {
    pub owner_id: i32,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Partial update: only `Some(_)` fields are modified.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateProjectDTO {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}
