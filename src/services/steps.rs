//! Step services - step CRUD inside a project

use crate::core::{AppError, AppState};
use crate::dtos::{CreateStepDTO, StepDTO, UpdateStepDTO};
use crate::entities::TeamMember;
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Inbound body for step creation; the project comes from the path and
/// the position defaults to the end of the list.
#[derive(serde::Deserialize)]
pub struct CreateStepRequestDTO {
    pub title: String,
    pub description: Option<String>,
    pub position: Option<i32>,
}

#[instrument(skip(state, _membership), fields(project_id = %project_id))]
pub async fn list_steps(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
) -> Result<Json<Vec<StepDTO>>, AppError> {
    let steps = state.step.list_by_project(project_id).await?;

    debug!("Project has {} steps", steps.len());
    Ok(Json(steps.into_iter().map(StepDTO::from).collect()))
}

#[instrument(skip(state, _membership, body), fields(project_id = %project_id))]
pub async fn create_step(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
    Json(body): Json<CreateStepRequestDTO>,
) -> Result<Json<StepDTO>, AppError> {
    debug!("Creating step");

    let position = match body.position {
        Some(position) => position,
        None => {
            let existing = state.step.list_by_project(project_id).await?;
            existing.last().map(|step| step.position + 1).unwrap_or(0)
        }
    };

    let new_step = CreateStepDTO {
        project_id,
        title: body.title,
        description: body.description,
        position,
    };
    new_step.validate()?;

    let step = state.step.create(&new_step).await?;

    info!("Step {} created in project {}", step.step_id, project_id);
    Ok(Json(StepDTO::from(step)))
}

#[instrument(skip(state, _membership, body), fields(project_id = %project_id, step_id = %step_id))]
pub async fn update_step(
    State(state): State<Arc<AppState>>,
    Path((project_id, step_id)): Path<(i32, i32)>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
    Json(body): Json<UpdateStepDTO>,
) -> Result<Json<StepDTO>, AppError> {
    debug!("Updating step");
    body.validate()?;

    // The step must belong to the project named in the path; a step id
    // from another project reads as not found.
    match state.step.find_by_id(step_id).await? {
        Some(step) if step.project_id == project_id => {}
        _ => {
            warn!("Step {} not found in project {}", step_id, project_id);
            return Err(AppError::not_found("Step not found in this project"));
        }
    }

    let updated = state.step.update(step_id, &body).await?;

    info!("Step {} updated", step_id);
    Ok(Json(StepDTO::from(updated)))
}

#[instrument(skip(state, _membership), fields(project_id = %project_id, step_id = %step_id))]
pub async fn delete_step(
    State(state): State<Arc<AppState>>,
    Path((project_id, step_id)): Path<(i32, i32)>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
) -> Result<(), AppError> {
    debug!("Deleting step");

    match state.step.find_by_id(step_id).await? {
        Some(step) if step.project_id == project_id => {}
        _ => {
            warn!("Step {} not found in project {}", step_id, project_id);
            return Err(AppError::not_found("Step not found in this project"));
        }
    }

    state.step.delete(step_id).await?;

    info!("Step {} deleted", step_id);
    Ok(())
}
