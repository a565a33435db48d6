//! User DTOs

use crate::entities::User;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub user_id: i32,
    pub username: String,
    pub email: String,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            user_id: value.user_id,
            username: value.username,
            email: value.email,
            // external_id stays internal, never exposed to clients
        }
    }
}

/// Store-level DTO for creating a user (id and timestamp assigned by the
/// store). Built by the identity resolver from session claims.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateUserDTO {
    pub external_id: String,
    pub username: String,
    /// Must already be lowercased by the caller.
    pub email: String,
}
