//! ProjectStep entity - a unit of work inside a project

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ProjectStep {
    pub step_id: i32,
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Ordering inside the project; steps are listed by ascending position.
    pub position: i32,
    pub created_at: DateTime<Utc>,
}
