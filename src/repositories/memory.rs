//! In-memory stores
//!
//! DashMap-backed implementations of the store traits. They back the unit
//! and integration test suites and double as a zero-dependency backend for
//! local development; production wiring uses the MySQL stores.

use super::{InvitationStore, MembershipStore, ProjectStore, StepStore, UserStore};
use crate::dtos::{CreateProjectDTO, CreateStepDTO, CreateUserDTO, UpdateProjectDTO, UpdateStepDTO};
use crate::entities::{
    InvitationStatus, Project, ProjectInvitation, ProjectStep, TeamMember, User,
};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI32, Ordering};

#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<i32, User>,
    next_id: AtomicI32,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, data: &CreateUserDTO) -> Result<User> {
        let user_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = User {
            user_id,
            external_id: data.external_id.clone(),
            username: data.username.clone(),
            email: data.email.clone(),
            created_at: Utc::now(),
        };
        self.users.insert(user_id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>> {
        Ok(self.users.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.external_id == external_id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn update_username(&self, user_id: i32, username: &str) -> Result<()> {
        match self.users.get_mut(&user_id) {
            Some(mut entry) => {
                entry.username = username.to_owned();
                Ok(())
            }
            None => Err(anyhow!("user {user_id} not found")),
        }
    }
}

#[derive(Default)]
pub struct MemoryProjectStore {
    projects: DashMap<i32, Project>,
    next_id: AtomicI32,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn create(&self, data: &CreateProjectDTO) -> Result<Project> {
        let project_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let project = Project {
            project_id,
            owner_id: data.owner_id,
            name: data.name.clone(),
            description: data.description.clone(),
            created_at: Utc::now(),
        };
        self.projects.insert(project_id, project.clone());
        Ok(project)
    }

    async fn find_by_id(&self, project_id: i32) -> Result<Option<Project>> {
        Ok(self.projects.get(&project_id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, project_id: i32, data: &UpdateProjectDTO) -> Result<Project> {
        let mut entry = self
            .projects
            .get_mut(&project_id)
            .ok_or_else(|| anyhow!("project {project_id} not found"))?;
        if let Some(ref name) = data.name {
            entry.name = name.clone();
        }
        if let Some(ref description) = data.description {
            entry.description = Some(description.clone());
        }
        Ok(entry.clone())
    }

    async fn delete(&self, project_id: i32) -> Result<()> {
        self.projects.remove(&project_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStepStore {
    steps: DashMap<i32, ProjectStep>,
    next_id: AtomicI32,
}

impl MemoryStepStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StepStore for MemoryStepStore {
    async fn create(&self, data: &CreateStepDTO) -> Result<ProjectStep> {
        let step_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let step = ProjectStep {
            step_id,
            project_id: data.project_id,
            title: data.title.clone(),
            description: data.description.clone(),
            completed: false,
            position: data.position,
            created_at: Utc::now(),
        };
        self.steps.insert(step_id, step.clone());
        Ok(step)
    }

    async fn find_by_id(&self, step_id: i32) -> Result<Option<ProjectStep>> {
        Ok(self.steps.get(&step_id).map(|entry| entry.value().clone()))
    }

    async fn list_by_project(&self, project_id: i32) -> Result<Vec<ProjectStep>> {
        let mut steps: Vec<ProjectStep> = self
            .steps
            .iter()
            .filter(|entry| entry.project_id == project_id)
            .map(|entry| entry.value().clone())
            .collect();
        steps.sort_by_key(|step| (step.position, step.step_id));
        Ok(steps)
    }

    async fn update(&self, step_id: i32, data: &UpdateStepDTO) -> Result<ProjectStep> {
        let mut entry = self
            .steps
            .get_mut(&step_id)
            .ok_or_else(|| anyhow!("step {step_id} not found"))?;
        if let Some(ref title) = data.title {
            entry.title = title.clone();
        }
        if let Some(ref description) = data.description {
            entry.description = Some(description.clone());
        }
        if let Some(completed) = data.completed {
            entry.completed = completed;
        }
        if let Some(position) = data.position {
            entry.position = position;
        }
        Ok(entry.clone())
    }

    async fn delete(&self, step_id: i32) -> Result<()> {
        self.steps.remove(&step_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMembershipStore {
    members: DashMap<(i32, i32), TeamMember>,
}

impl MemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipStore for MemoryMembershipStore {
    async fn insert(&self, member: &TeamMember) -> Result<bool> {
        // Entry API gives the same check-and-insert atomicity the MySQL
        // unique key provides.
        match self.members.entry((member.project_id, member.user_id)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(member.clone());
                Ok(true)
            }
        }
    }

    async fn exists(&self, project_id: i32, user_id: i32) -> Result<bool> {
        Ok(self.members.contains_key(&(project_id, user_id)))
    }

    async fn find(&self, project_id: i32, user_id: i32) -> Result<Option<TeamMember>> {
        Ok(self
            .members
            .get(&(project_id, user_id))
            .map(|entry| entry.value().clone()))
    }

    async fn list_by_project(&self, project_id: i32) -> Result<Vec<TeamMember>> {
        let mut members: Vec<TeamMember> = self
            .members
            .iter()
            .filter(|entry| entry.project_id == project_id)
            .map(|entry| entry.value().clone())
            .collect();
        members.sort_by_key(|member| (member.added_at, member.user_id));
        Ok(members)
    }

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<TeamMember>> {
        let mut members: Vec<TeamMember> = self
            .members
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        members.sort_by_key(|member| (member.added_at, member.project_id));
        Ok(members)
    }

    async fn remove(&self, project_id: i32, user_id: i32) -> Result<()> {
        self.members.remove(&(project_id, user_id));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryInvitationStore {
    invitations: DashMap<String, ProjectInvitation>,
}

impl MemoryInvitationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvitationStore for MemoryInvitationStore {
    async fn create(&self, invitation: &ProjectInvitation) -> Result<()> {
        self.invitations
            .insert(invitation.token.clone(), invitation.clone());
        Ok(())
    }

    async fn find_pending_by_token(&self, token: &str) -> Result<Option<ProjectInvitation>> {
        Ok(self
            .invitations
            .get(token)
            .filter(|entry| entry.status == InvitationStatus::Pending)
            .map(|entry| entry.value().clone()))
    }

    async fn has_pending(&self, project_id: i32, email: &str) -> Result<bool> {
        let needle = email.to_lowercase();
        Ok(self.invitations.iter().any(|entry| {
            entry.project_id == project_id
                && entry.status == InvitationStatus::Pending
                && entry.email.to_lowercase() == needle
        }))
    }

    async fn list_pending_by_project(&self, project_id: i32) -> Result<Vec<ProjectInvitation>> {
        let mut invitations: Vec<ProjectInvitation> = self
            .invitations
            .iter()
            .filter(|entry| {
                entry.project_id == project_id && entry.status == InvitationStatus::Pending
            })
            .map(|entry| entry.value().clone())
            .collect();
        invitations.sort_by_key(|invitation| invitation.created_at);
        Ok(invitations)
    }

    async fn list_pending_by_email(&self, email: &str) -> Result<Vec<ProjectInvitation>> {
        let needle = email.to_lowercase();
        let mut invitations: Vec<ProjectInvitation> = self
            .invitations
            .iter()
            .filter(|entry| {
                entry.status == InvitationStatus::Pending && entry.email.to_lowercase() == needle
            })
            .map(|entry| entry.value().clone())
            .collect();
        invitations.sort_by_key(|invitation| invitation.created_at);
        Ok(invitations)
    }

    async fn mark_accepted(
        &self,
        token: &str,
        accepted_by: i32,
        accepted_at: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(mut entry) = self.invitations.get_mut(token) {
            if entry.status == InvitationStatus::Pending {
                entry.status = InvitationStatus::Accepted;
                entry.accepted_at = Some(accepted_at);
                entry.accepted_by = Some(accepted_by);
            }
        }
        Ok(())
    }
}
