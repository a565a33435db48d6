//! Store traits
//!
//! Object-safe async interfaces over the persisted collections. The
//! orchestrator and the HTTP handlers depend only on these traits; the
//! MySQL implementations live beside them and an in-memory backend backs
//! the test suites.

use crate::dtos::{CreateProjectDTO, CreateStepDTO, CreateUserDTO, UpdateProjectDTO, UpdateStepDTO};
use crate::entities::{Project, ProjectInvitation, ProjectStep, TeamMember, User};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user; id and creation timestamp are assigned by the store.
    async fn create(&self, data: &CreateUserDTO) -> Result<User>;

    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>>;

    /// Lookup by the auth provider's subject claim.
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>>;

    /// Lookup by email. `email` must already be lowercased; stored emails
    /// are normalized on insert, so this is a case-insensitive match.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Refreshes the display name (the only mutable user field).
    async fn update_username(&self, user_id: i32, username: &str) -> Result<()>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create(&self, data: &CreateProjectDTO) -> Result<Project>;

    async fn find_by_id(&self, project_id: i32) -> Result<Option<Project>>;

    /// Partial update; only `Some(_)` fields are modified.
    async fn update(&self, project_id: i32, data: &UpdateProjectDTO) -> Result<Project>;

    async fn delete(&self, project_id: i32) -> Result<()>;
}

#[async_trait]
pub trait StepStore: Send + Sync {
    async fn create(&self, data: &CreateStepDTO) -> Result<ProjectStep>;

    async fn find_by_id(&self, step_id: i32) -> Result<Option<ProjectStep>>;

    /// Steps of a project in ascending `position` order.
    async fn list_by_project(&self, project_id: i32) -> Result<Vec<ProjectStep>>;

    async fn update(&self, step_id: i32, data: &UpdateStepDTO) -> Result<ProjectStep>;

    async fn delete(&self, step_id: i32) -> Result<()>;
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Inserts a membership fact. Returns `false` when the (project, user)
    /// row already existed: the storage unique key absorbs the
    /// check-then-insert race, and the caller treats a lost race as the
    /// already-member signal.
    async fn insert(&self, member: &TeamMember) -> Result<bool>;

    async fn exists(&self, project_id: i32, user_id: i32) -> Result<bool>;

    async fn find(&self, project_id: i32, user_id: i32) -> Result<Option<TeamMember>>;

    async fn list_by_project(&self, project_id: i32) -> Result<Vec<TeamMember>>;

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<TeamMember>>;

    async fn remove(&self, project_id: i32, user_id: i32) -> Result<()>;
}

#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Persists a fully-built invitation (token, expiry and status are
    /// decided by the caller).
    async fn create(&self, invitation: &ProjectInvitation) -> Result<()>;

    /// Token lookup restricted to `PENDING` rows. Accepted tokens and
    /// unknown tokens are indistinguishable here, which is what the
    /// acceptance flow wants.
    async fn find_pending_by_token(&self, token: &str) -> Result<Option<ProjectInvitation>>;

    /// Whether a pending invitation exists for (project, email). The email
    /// is compared case-insensitively against the stored case-preserved
    /// address.
    async fn has_pending(&self, project_id: i32, email: &str) -> Result<bool>;

    async fn list_pending_by_project(&self, project_id: i32) -> Result<Vec<ProjectInvitation>>;

    /// Pending invitations addressed to `email` (lowercased), across
    /// projects.
    async fn list_pending_by_email(&self, email: &str) -> Result<Vec<ProjectInvitation>>;

    /// Transitions a pending invitation to `ACCEPTED`. The transition is
    /// one-way; a row that is already accepted is left untouched.
    async fn mark_accepted(
        &self,
        token: &str,
        accepted_by: i32,
        accepted_at: DateTime<Utc>,
    ) -> Result<()>;
}
