//! Team member DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Member of a project as listed to clients; `username` is joined in from
/// the users collection and absent if the account has disappeared.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TeamMemberDTO {
    pub project_id: i32,
    pub user_id: i32,
    pub username: Option<String>,
    pub email: String,
    pub added_at: DateTime<Utc>,
}
