//! User services - current principal

use crate::core::{AppError, AppState};
use crate::dtos::UserDTO;
use crate::entities::User;
use axum::{Extension, extract::State};
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// The user record the identity resolver produced for this session.
#[instrument(skip(_state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_me(
    State(_state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<UserDTO>, AppError> {
    Ok(Json(UserDTO::from(current_user)))
}
