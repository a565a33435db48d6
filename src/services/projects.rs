//! Project services - project CRUD

use crate::core::{AppError, AppState, require_owner};
use crate::dtos::{CreateProjectDTO, ProjectDTO, UpdateProjectDTO};
use crate::entities::{Project, TeamMember, User};
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Inbound body for project creation; the owner comes from the session.
#[derive(serde::Deserialize)]
pub struct CreateProjectRequestDTO {
    pub name: String,
    pub description: Option<String>,
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<ProjectDTO>>, AppError> {
    debug!("Listing projects for user");

    let project_ids: Vec<i32> = state
        .member
        .list_by_user(current_user.user_id)
        .await?
        .into_iter()
        .map(|membership| membership.project_id)
        .collect();

    debug!("User is member of {} projects", project_ids.len());

    let projects: Vec<Project> = try_join_all(project_ids.into_iter().map(|project_id| {
        let state = state.clone();
        async move { state.project.find_by_id(project_id).await }
    }))
    .await?
    .into_iter()
    .flatten()
    .collect();

    let projects_dto: Vec<ProjectDTO> = projects.into_iter().map(ProjectDTO::from).collect();

    info!("Successfully retrieved {} projects", projects_dto.len());
    Ok(Json(projects_dto))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateProjectRequestDTO>,
) -> Result<Json<ProjectDTO>, AppError> {
    debug!("Creating new project");

    let new_project = CreateProjectDTO {
        owner_id: current_user.user_id,
        name: body.name,
        description: body.description,
    };
    new_project.validate()?;

    let project = state.project.create(&new_project).await?;

    // The owner is a collaborator like any other: creating the project
    // also creates their membership row.
    state
        .member
        .insert(&TeamMember {
            project_id: project.project_id,
            user_id: current_user.user_id,
            member_email: current_user.email.clone(),
            added_at: Utc::now(),
        })
        .await?;

    info!(
        "Project '{}' created by user {}",
        project.name, current_user.user_id
    );
    Ok(Json(ProjectDTO::from(project)))
}

#[instrument(skip(state, _membership), fields(project_id = %project_id))]
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
) -> Result<Json<ProjectDTO>, AppError> {
    let project = state
        .project
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| {
            warn!("Project not found: {}", project_id);
            AppError::not_found("Project not found")
        })?;

    Ok(Json(ProjectDTO::from(project)))
}

#[instrument(skip(state, _membership, body), fields(project_id = %project_id))]
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
    Json(body): Json<UpdateProjectDTO>,
) -> Result<Json<ProjectDTO>, AppError> {
    debug!("Updating project");
    body.validate()?;

    // Re-read first so a vanished project reads as 404 instead of a
    // storage error.
    if state.project.find_by_id(project_id).await?.is_none() {
        warn!("Project not found: {}", project_id);
        return Err(AppError::not_found("Project not found"));
    }

    let updated = state.project.update(project_id, &body).await?;

    info!("Project {} updated", project_id);
    Ok(Json(ProjectDTO::from(updated)))
}

#[instrument(skip(state, current_user, _membership), fields(project_id = %project_id, user_id = %current_user.user_id))]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Extension(current_user): Extension<User>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
) -> Result<(), AppError> {
    debug!("Deleting project");

    let project = state
        .project
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| {
            warn!("Project not found: {}", project_id);
            AppError::not_found("Project not found")
        })?;

    require_owner(&project, &current_user)?;

    state.project.delete(project_id).await?;

    info!("Project {} deleted by its owner", project_id);
    Ok(())
}
