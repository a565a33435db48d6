//! TeamMember entity - membership fact for a (project, user) pair

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct TeamMember {
    pub project_id: i32,
    pub user_id: i32,
    /// Denormalized copy of the member's email at join time, for display.
    pub member_email: String,
    pub added_at: DateTime<Utc>,
}
