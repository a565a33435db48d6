//! Identity resolver - session claims to internal user records
//!
//! Maps the auth provider's subject claim to a row in `users`, creating
//! the row on first sign-in. The only mutation ever applied afterwards is
//! a display-name refresh when the provider claim changed.

use crate::core::auth::Claims;
use crate::core::error::AppError;
use crate::dtos::CreateUserDTO;
use crate::entities::User;
use crate::repositories::UserStore;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    #[instrument(skip(self, claims), fields(external_id = %claims.sub))]
    pub async fn resolve(&self, claims: &Claims) -> Result<User, AppError> {
        if let Some(user) = self.users.find_by_external_id(&claims.sub).await? {
            if let Some(name) = &claims.name {
                if *name != user.username {
                    debug!("Refreshing display name from provider claim");
                    self.users.update_username(user.user_id, name).await?;
                    return Ok(User {
                        username: name.clone(),
                        ..user
                    });
                }
            }
            return Ok(user);
        }

        // First sign-in: create the record. The email is normalized here
        // and stays lowercased for the lifetime of the account.
        let username = claims
            .name
            .clone()
            .unwrap_or_else(|| claims.email.clone());
        let created = self
            .users
            .create(&CreateUserDTO {
                external_id: claims.sub.clone(),
                username,
                email: claims.email.trim().to_lowercase(),
            })
            .await?;

        info!("Created user {} on first sign-in", created.user_id);
        Ok(created)
    }
}
