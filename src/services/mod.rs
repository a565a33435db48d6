//! Services module - HTTP handlers per resource
//!
//! Each sub-module owns the endpoints of one resource; the invitation
//! handlers delegate the actual workflow to `invites::InvitationService`.

pub mod membership;
pub mod projects;
pub mod steps;
pub mod users;

pub use membership::{
    accept_invitation, invite_to_project, list_my_invitations, list_project_invitations,
    list_project_members, remove_member,
};
pub use projects::{create_project, delete_project, get_project, list_projects, update_project};
pub use steps::{create_step, delete_step, list_steps, update_step};
pub use users::get_me;

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
