//! Server library - exposes the application modules for the binary and
//! the integration tests

pub mod core;
pub mod dtos;
pub mod email;
pub mod entities;
pub mod invites;
pub mod monitoring;
pub mod repositories;
pub mod services;

// Re-exports of the main types to simplify imports
pub use crate::core::{AppError, AppState, Config};
pub use crate::services::root;

use axum::{
    Router, middleware,
    routing::{delete, get, patch},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Builds the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(root))
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/projects", configure_project_routes(state.clone()))
        .nest("/invitations", configure_invitation_routes(state.clone()))
        // Target of the emailed acceptance link; only a session is
        // required, membership is what acceptance creates.
        .route(
            "/invite/accept",
            get(accept_invitation).layer(middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            )),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Routes about the current principal
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/me", get(get_me))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Project routes: listing/creation need only a session, everything
/// project-scoped also goes through the membership middleware
fn configure_project_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, project_membership_middleware};
    use crate::services::*;

    let public_routes = Router::new()
        .route("/", get(list_projects).post(create_project))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    let member_routes = Router::new()
        .route(
            "/{project_id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/{project_id}/steps", get(list_steps).post(create_step))
        .route(
            "/{project_id}/steps/{step_id}",
            patch(update_step).delete(delete_step),
        )
        .route("/{project_id}/members", get(list_project_members))
        .route("/{project_id}/members/{user_id}", delete(remove_member))
        .route(
            "/{project_id}/invites",
            get(list_project_invitations).post(invite_to_project),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            project_membership_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(member_routes)
}

/// Invitation routes scoped to the invitee
fn configure_invitation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/pending", get(list_my_invitations))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
