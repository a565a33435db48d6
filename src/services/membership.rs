//! Membership services - team listing, invitations, acceptance

use crate::core::{AppError, AppState, require_owner};
use crate::dtos::{
    AcceptInviteQuery, EnrichedInvitationDTO, InvitationDTO, InviteRequestDTO, TeamMemberDTO,
};
use crate::entities::{TeamMember, User};
use crate::invites::{AcceptedInvitation, InviteOutcome};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
};
use axum_macros::debug_handler;
use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, _membership), fields(project_id = %project_id))]
pub async fn list_project_members(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
) -> Result<Json<Vec<TeamMemberDTO>>, AppError> {
    debug!("Listing members for project");

    let members = state.member.list_by_project(project_id).await?;

    debug!("Found {} members in project", members.len());

    // Join usernames in memory; a vanished account simply lists without
    // one.
    let users: Vec<Option<User>> = try_join_all(members.iter().map(|member| {
        let state = state.clone();
        let user_id = member.user_id;
        async move { state.user.find_by_id(user_id).await }
    }))
    .await?;

    let result: Vec<TeamMemberDTO> = members
        .into_iter()
        .zip(users)
        .map(|(member, user)| TeamMemberDTO {
            project_id: member.project_id,
            user_id: member.user_id,
            username: user.map(|user| user.username),
            email: member.member_email,
            added_at: member.added_at,
        })
        .collect();

    info!("Successfully retrieved {} members", result.len());
    Ok(Json(result))
}

/// Batch invite endpoint: one outcome per submitted address, in input
/// order. Expected skips (already a member, duplicate invitation) are
/// outcome data, so the response status is 200 even when some addresses
/// changed nothing.
#[debug_handler]
#[instrument(skip(state, current_user, _membership, body), fields(project_id = %project_id, user_id = %current_user.user_id))]
pub async fn invite_to_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Extension(current_user): Extension<User>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
    Json(body): Json<InviteRequestDTO>,
) -> Result<Json<Vec<InviteOutcome>>, AppError> {
    debug!("Inviting {} addresses to project", body.emails.len());
    body.validate()?;

    let outcomes = state
        .invites
        .process_invites(project_id, &body.emails, &current_user.email)
        .await?;

    Ok(Json(outcomes))
}

#[instrument(skip(state, _membership), fields(project_id = %project_id))]
pub async fn list_project_invitations(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i32>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
) -> Result<Json<Vec<InvitationDTO>>, AppError> {
    debug!("Listing pending invitations for project");

    let now = Utc::now();
    let invitations: Vec<InvitationDTO> = state
        .invitation
        .list_pending_by_project(project_id)
        .await?
        .into_iter()
        // Expiry is evaluated at read time; expired rows stay PENDING in
        // storage but are not listed.
        .filter(|invitation| !invitation.is_expired(now))
        .map(InvitationDTO::from)
        .collect();

    info!("Found {} pending invitations", invitations.len());
    Ok(Json(invitations))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_my_invitations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<EnrichedInvitationDTO>>, AppError> {
    debug!("Listing pending invitations for user");

    let now = Utc::now();
    let invitations: Vec<_> = state
        .invitation
        .list_pending_by_email(&current_user.email)
        .await?
        .into_iter()
        .filter(|invitation| !invitation.is_expired(now))
        .collect();

    info!("Found {} pending invitations", invitations.len());

    // Enrich each invitation with the project name and the inviter's
    // display name.
    let mut enriched_invitations = Vec::new();

    for invitation in invitations {
        let project_name = state
            .project
            .find_by_id(invitation.project_id)
            .await
            .ok()
            .flatten()
            .map(|project| project.name);

        let inviter_name = state
            .user
            .find_by_id(invitation.invited_by)
            .await
            .ok()
            .flatten()
            .map(|user| user.username);

        enriched_invitations.push(EnrichedInvitationDTO {
            token: invitation.token,
            project_id: invitation.project_id,
            project_name,
            inviter_name,
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
        });
    }

    Ok(Json(enriched_invitations))
}

/// Target of the emailed acceptance link
/// (`/invite/accept?token=…&project=…`). The token alone decides which
/// invitation is consumed.
#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id))]
pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(query): Query<AcceptInviteQuery>,
) -> Result<Json<AcceptedInvitation>, AppError> {
    debug!("Accepting invitation");

    let accepted = state
        .invites
        .accept_invitation(&query.token, &current_user.email)
        .await?;

    info!("Invitation accepted for project {}", accepted.project_id);
    Ok(Json(accepted))
}

#[instrument(skip(state, current_user, _membership), fields(project_id = %project_id, removing_user = %current_user.user_id, target_user = %user_id))]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path((project_id, user_id)): Path<(i32, i32)>,
    Extension(current_user): Extension<User>,
    Extension(_membership): Extension<TeamMember>, // membership verified by middleware
) -> Result<(), AppError> {
    debug!("Removing member from project");

    let project = state
        .project
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| {
            warn!("Project not found: {}", project_id);
            AppError::not_found("Project not found")
        })?;

    require_owner(&project, &current_user)?;

    if user_id == project.owner_id {
        warn!("Attempted to remove the project owner");
        return Err(AppError::forbidden(
            "The project owner cannot be removed from the team",
        ));
    }

    if state.member.find(project_id, user_id).await?.is_none() {
        warn!("Target user {} is not a member of project {}", user_id, project_id);
        return Err(AppError::not_found(
            "The user to be removed is not a member of this project",
        ));
    }

    state.member.remove(project_id, user_id).await?;

    info!("Member {} removed from project {}", user_id, project_id);
    Ok(())
}
