//! User entity - account record created on first sign-in

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i32,
    /// Opaque subject claim from the external auth provider, unique.
    pub external_id: String,
    /// Display name, refreshed from the provider claim on sign-in.
    pub username: String,
    /// Stored lowercased; all email matching in the system is done on
    /// this normalized form.
    pub email: String,
    pub created_at: DateTime<Utc>,
}
