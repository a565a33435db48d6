//! InvitationService - the invitation workflow orchestrator

use super::outcome::{AcceptedInvitation, InviteOutcome, InviteSkipReason};
use crate::core::AppError;
use crate::email::{InviteNotification, NotificationDispatcher};
use crate::entities::{Project, ProjectInvitation, TeamMember, User};
use crate::repositories::{InvitationStore, MembershipStore, ProjectStore, UserStore};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Upper bound on one notification dispatch. Persistence has already
/// happened when dispatch starts, so hitting the bound only produces a
/// warning on the outcome.
pub const DISPATCH_TIMEOUT_SECS: u64 = 10;

/// Coordinates user resolution, membership and invitation storage, and
/// notification dispatch for the invite lifecycle. Storage checks here are
/// check-then-act; the membership store's unique key turns the one race
/// that matters into an `AlreadyMember` signal.
#[derive(Clone)]
pub struct InvitationService {
    users: Arc<dyn UserStore>,
    projects: Arc<dyn ProjectStore>,
    members: Arc<dyn MembershipStore>,
    invitations: Arc<dyn InvitationStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl InvitationService {
    pub fn new(
        users: Arc<dyn UserStore>,
        projects: Arc<dyn ProjectStore>,
        members: Arc<dyn MembershipStore>,
        invitations: Arc<dyn InvitationStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            users,
            projects,
            members,
            invitations,
            dispatcher,
        }
    }

    /// Processes a single invite request for `raw_email`.
    ///
    /// Resolves the address against known users: a match is added to the
    /// team directly, anything else gets a pending invitation and an email.
    /// `AlreadyMember` and `DuplicateInvite` come back as outcome data,
    /// not errors.
    #[instrument(skip(self, raw_email, session_email), fields(project_id = %project_id))]
    pub async fn process_invite(
        &self,
        project_id: i32,
        raw_email: &str,
        session_email: &str,
    ) -> Result<InviteOutcome, AppError> {
        let (project, inviter) = self.load_context(project_id, session_email).await?;
        self.process_one(&project, &inviter, raw_email).await
    }

    /// Batch variant: each address goes through the same pipeline
    /// concurrently, outcomes come back in input order, and one failing
    /// address never aborts the rest.
    #[instrument(skip(self, emails, session_email), fields(project_id = %project_id, count = emails.len()))]
    pub async fn process_invites(
        &self,
        project_id: i32,
        emails: &[String],
        session_email: &str,
    ) -> Result<Vec<InviteOutcome>, AppError> {
        if emails.is_empty() {
            return Err(AppError::bad_request("At least one email is required"));
        }

        let (project, inviter) = self.load_context(project_id, session_email).await?;

        let project_ref = &project;
        let inviter_ref = &inviter;
        let outcomes = join_all(emails.iter().map(|email| async move {
            match self.process_one(project_ref, inviter_ref, email).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(email = %email, "invite processing failed: {}", error.message());
                    InviteOutcome::failed(email.trim(), error.message())
                }
            }
        }))
        .await;

        info!(
            "Processed {} invites, {} succeeded",
            outcomes.len(),
            outcomes.iter().filter(|outcome| outcome.success).count()
        );
        Ok(outcomes)
    }

    /// Validates and consumes a pending invitation for the authenticated
    /// caller, producing the membership fact.
    ///
    /// Unknown, consumed and mistyped tokens are deliberately collapsed
    /// into one not-found answer; an expired token is reported as such but
    /// stays `PENDING` in storage.
    #[instrument(skip(self, token, session_email))]
    pub async fn accept_invitation(
        &self,
        token: &str,
        session_email: &str,
    ) -> Result<AcceptedInvitation, AppError> {
        if token.trim().is_empty() {
            return Err(AppError::bad_request("Invitation token must not be empty"));
        }

        let invitation = self
            .invitations
            .find_pending_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Invalid or expired invitation"))?;

        let now = Utc::now();
        if invitation.is_expired(now) {
            debug!(project_id = %invitation.project_id, "invitation expired");
            return Err(AppError::gone("This invitation has expired"));
        }

        let session_normalized = session_email.trim().to_lowercase();
        if session_normalized.is_empty() {
            return Err(AppError::unauthorized("You must sign in to accept an invitation"));
        }

        // A token leaked to the wrong inbox must not grant access: the
        // session email has to match the invited address.
        if invitation.email.to_lowercase() != session_normalized {
            warn!(project_id = %invitation.project_id, "invitation email mismatch");
            return Err(AppError::forbidden(
                "This invitation was issued to a different email address",
            )
            .with_details(format!(
                "invited: {}, signed in as: {}",
                invitation.email, session_email
            )));
        }

        let user = self
            .users
            .find_by_email(&session_normalized)
            .await?
            .ok_or_else(|| AppError::unauthorized("No account for the current session"))?;

        if self.members.exists(invitation.project_id, user.user_id).await? {
            // Already on the team: close the invitation out without
            // inserting a duplicate membership.
            self.invitations
                .mark_accepted(&invitation.token, user.user_id, now)
                .await?;
            info!(project_id = %invitation.project_id, "invitation closed for existing member");
            return Ok(AcceptedInvitation {
                project_id: invitation.project_id,
            });
        }

        let member = TeamMember {
            project_id: invitation.project_id,
            user_id: user.user_id,
            member_email: user.email.clone(),
            added_at: now,
        };
        self.members.insert(&member).await?;
        self.invitations
            .mark_accepted(&invitation.token, user.user_id, now)
            .await?;

        info!(project_id = %invitation.project_id, user_id = %user.user_id, "invitation accepted");
        Ok(AcceptedInvitation {
            project_id: invitation.project_id,
        })
    }

    /// Resolves the inviter from the session and loads the project (its
    /// name goes into the notification email).
    async fn load_context(
        &self,
        project_id: i32,
        session_email: &str,
    ) -> Result<(Project, User), AppError> {
        let normalized = session_email.trim().to_lowercase();
        let inviter = self
            .users
            .find_by_email(&normalized)
            .await?
            .ok_or_else(|| AppError::unauthorized("No account for the current session"))?;

        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))?;

        Ok((project, inviter))
    }

    async fn process_one(
        &self,
        project: &Project,
        inviter: &User,
        raw_email: &str,
    ) -> Result<InviteOutcome, AppError> {
        let display_email = raw_email.trim();
        // Normalized for matching only; storage and display keep the
        // submitted casing.
        let normalized = display_email.to_lowercase();
        if normalized.is_empty() {
            return Err(AppError::bad_request("Email must not be empty"));
        }

        if let Some(user) = self.users.find_by_email(&normalized).await? {
            // Direct-add path: the address belongs to a known account.
            if self.members.exists(project.project_id, user.user_id).await? {
                debug!(user_id = %user.user_id, "already a member, skipping");
                return Ok(InviteOutcome::skipped(
                    display_email,
                    InviteSkipReason::AlreadyMember,
                ));
            }

            let member = TeamMember {
                project_id: project.project_id,
                user_id: user.user_id,
                member_email: user.email.clone(),
                added_at: Utc::now(),
            };
            if !self.members.insert(&member).await? {
                // Lost the check-then-insert race; same signal as above.
                return Ok(InviteOutcome::skipped(
                    display_email,
                    InviteSkipReason::AlreadyMember,
                ));
            }

            info!(user_id = %user.user_id, "added existing user to project");
            return Ok(InviteOutcome::added(display_email));
        }

        // Invitation path: no account for this address yet.
        if self
            .invitations
            .has_pending(project.project_id, &normalized)
            .await?
        {
            debug!("pending invitation already exists, skipping");
            return Ok(InviteOutcome::skipped(
                display_email,
                InviteSkipReason::DuplicateInvite,
            ));
        }

        let invitation = ProjectInvitation::new_pending(
            project.project_id,
            display_email,
            inviter.user_id,
            Utc::now(),
        );
        self.invitations.create(&invitation).await?;
        info!("created pending invitation");

        // Dispatch is strictly after persistence and its failure is not
        // rolled back: an undelivered invitation can still be resent or
        // accepted via the logged link.
        let notification = InviteNotification {
            to_address: display_email.to_owned(),
            project_name: project.name.clone(),
            inviter_name: inviter.username.clone(),
            token: invitation.token.clone(),
            project_id: project.project_id,
        };

        let warning = match tokio::time::timeout(
            Duration::from_secs(DISPATCH_TIMEOUT_SECS),
            self.dispatcher.send(&notification),
        )
        .await
        {
            Ok(Ok(())) => None,
            Ok(Err(error)) => {
                warn!("invitation email dispatch failed: {error}");
                Some(format!("invitation saved but email delivery failed: {error}"))
            }
            Err(_) => {
                warn!("invitation email dispatch timed out after {DISPATCH_TIMEOUT_SECS}s");
                Some(format!(
                    "invitation saved but email delivery timed out after {DISPATCH_TIMEOUT_SECS}s"
                ))
            }
        };

        Ok(InviteOutcome::invited(display_email, warning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::{CreateProjectDTO, CreateUserDTO};
    use crate::email::EmailError;
    use crate::entities::INVITATION_TTL_DAYS;
    use crate::repositories::memory::{
        MemoryInvitationStore, MemoryMembershipStore, MemoryProjectStore, MemoryUserStore,
    };
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use chrono::Duration as ChronoDuration;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Dispatcher double that records notifications and can be told to
    /// fail.
    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<InviteNotification>>,
        fail: AtomicBool,
    }

    impl RecordingDispatcher {
        fn sent(&self) -> Vec<InviteNotification> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn send(&self, invite: &InviteNotification) -> Result<(), EmailError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(EmailError::SendFailed("smtp connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(invite.clone());
            Ok(())
        }
    }

    struct Fixture {
        service: InvitationService,
        users: Arc<MemoryUserStore>,
        members: Arc<MemoryMembershipStore>,
        invitations: Arc<MemoryInvitationStore>,
        dispatcher: Arc<RecordingDispatcher>,
        owner: User,
        project: Project,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserStore::new());
        let projects = Arc::new(MemoryProjectStore::new());
        let members = Arc::new(MemoryMembershipStore::new());
        let invitations = Arc::new(MemoryInvitationStore::new());
        let dispatcher = Arc::new(RecordingDispatcher::default());

        let owner = users
            .create(&CreateUserDTO {
                external_id: "oauth|owner".to_string(),
                username: "Owner".to_string(),
                email: "owner@example.com".to_string(),
            })
            .await
            .unwrap();
        let project = projects
            .create(&CreateProjectDTO {
                owner_id: owner.user_id,
                name: "Launch Plan".to_string(),
                description: None,
            })
            .await
            .unwrap();
        members
            .insert(&TeamMember {
                project_id: project.project_id,
                user_id: owner.user_id,
                member_email: owner.email.clone(),
                added_at: Utc::now(),
            })
            .await
            .unwrap();

        let service = InvitationService::new(
            users.clone(),
            projects.clone(),
            members.clone(),
            invitations.clone(),
            dispatcher.clone(),
        );

        Fixture {
            service,
            users,
            members,
            invitations,
            dispatcher,
            owner,
            project,
        }
    }

    async fn seed_user(fx: &Fixture, external_id: &str, username: &str, email: &str) -> User {
        fx.users
            .create(&CreateUserDTO {
                external_id: external_id.to_string(),
                username: username.to_string(),
                email: email.to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn existing_user_is_added_directly_without_invitation() {
        let fx = fixture().await;
        let target = seed_user(&fx, "oauth|t", "Target", "existing.user@example.com").await;

        let outcome = fx
            .service
            .process_invite(
                fx.project.project_id,
                "Existing.User@example.com",
                &fx.owner.email,
            )
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(!outcome.is_invitation);
        assert!(
            fx.members
                .exists(fx.project.project_id, target.user_id)
                .await
                .unwrap()
        );
        assert!(
            fx.invitations
                .list_pending_by_project(fx.project.project_id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn unknown_email_gets_a_pending_invitation_and_an_email() {
        let fx = fixture().await;

        let outcome = fx
            .service
            .process_invite(fx.project.project_id, "new.user@example.com", &fx.owner.email)
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.is_invitation);
        assert!(outcome.warning.is_none());

        let pending = fx
            .invitations
            .list_pending_by_project(fx.project.project_id)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(
            pending[0].expires_at - pending[0].created_at,
            ChronoDuration::days(INVITATION_TTL_DAYS)
        );

        let sent = fx.dispatcher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_address, "new.user@example.com");
        assert_eq!(sent[0].token, pending[0].token);
        assert_eq!(sent[0].project_name, "Launch Plan");
        assert_eq!(sent[0].inviter_name, "Owner");
    }

    #[tokio::test]
    async fn each_invitation_gets_a_distinct_token() {
        let fx = fixture().await;

        fx.service
            .process_invite(fx.project.project_id, "a@example.com", &fx.owner.email)
            .await
            .unwrap();
        fx.service
            .process_invite(fx.project.project_id, "b@example.com", &fx.owner.email)
            .await
            .unwrap();

        let sent = fx.dispatcher.sent();
        assert_eq!(sent.len(), 2);
        assert_ne!(sent[0].token, sent[1].token);
    }

    #[tokio::test]
    async fn second_invite_for_same_address_reports_duplicate() {
        let fx = fixture().await;

        let first = fx
            .service
            .process_invite(fx.project.project_id, "new.user@example.com", &fx.owner.email)
            .await
            .unwrap();
        let second = fx
            .service
            .process_invite(fx.project.project_id, "New.User@Example.com", &fx.owner.email)
            .await
            .unwrap();

        assert!(first.success);
        assert!(!second.success);
        assert_eq!(second.reason, Some(InviteSkipReason::DuplicateInvite));

        let pending = fx
            .invitations
            .list_pending_by_project(fx.project.project_id)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn member_is_reported_as_already_member_every_time() {
        let fx = fixture().await;
        seed_user(&fx, "oauth|t", "Target", "member@example.com").await;

        let first = fx
            .service
            .process_invite(fx.project.project_id, "member@example.com", &fx.owner.email)
            .await
            .unwrap();
        assert!(first.success);

        for _ in 0..2 {
            let repeat = fx
                .service
                .process_invite(fx.project.project_id, "member@example.com", &fx.owner.email)
                .await
                .unwrap();
            assert!(!repeat.success);
            assert_eq!(repeat.reason, Some(InviteSkipReason::AlreadyMember));
        }

        let members = fx
            .members
            .list_by_project(fx.project.project_id)
            .await
            .unwrap();
        // owner + the added member, nothing duplicated
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn dispatch_failure_keeps_the_invitation_and_surfaces_a_warning() {
        let fx = fixture().await;
        fx.dispatcher.fail.store(true, Ordering::SeqCst);

        let outcome = fx
            .service
            .process_invite(fx.project.project_id, "new.user@example.com", &fx.owner.email)
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.is_invitation);
        let warning = outcome.warning.expect("warning expected");
        assert!(warning.contains("smtp connection refused"));

        let pending = fx
            .invitations
            .list_pending_by_project(fx.project.project_id)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn empty_email_is_a_validation_error() {
        let fx = fixture().await;

        let error = fx
            .service
            .process_invite(fx.project.project_id, "   ", &fx.owner.email)
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_inviter_session_is_an_auth_error() {
        let fx = fixture().await;

        let error = fx
            .service
            .process_invite(fx.project.project_id, "a@x.com", "ghost@example.com")
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn batch_reports_one_outcome_per_address_in_input_order() {
        let fx = fixture().await;
        seed_user(&fx, "oauth|t", "Target", "existing@example.com").await;

        let emails = vec![
            "fresh@example.com".to_string(),
            "   ".to_string(),
            "existing@example.com".to_string(),
        ];
        let outcomes = fx
            .service
            .process_invites(fx.project.project_id, &emails, &fx.owner.email)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].success && outcomes[0].is_invitation);
        assert!(!outcomes[1].success);
        assert!(outcomes[1].error.is_some());
        assert!(outcomes[2].success && !outcomes[2].is_invitation);
    }

    #[tokio::test]
    async fn accepting_an_invitation_creates_the_membership_once() {
        let fx = fixture().await;

        fx.service
            .process_invite(fx.project.project_id, "new.user@example.com", &fx.owner.email)
            .await
            .unwrap();
        let token = fx.dispatcher.sent()[0].token.clone();

        // The recipient signs in, which creates their account.
        let recipient = seed_user(&fx, "oauth|r", "Recipient", "new.user@example.com").await;

        // Case-insensitive comparison: the session email casing differs.
        let accepted = fx
            .service
            .accept_invitation(&token, "New.User@EXAMPLE.com")
            .await
            .unwrap();
        assert_eq!(accepted.project_id, fx.project.project_id);
        assert!(
            fx.members
                .exists(fx.project.project_id, recipient.user_id)
                .await
                .unwrap()
        );
        assert!(
            fx.invitations
                .find_pending_by_token(&token)
                .await
                .unwrap()
                .is_none()
        );

        // Second acceptance: the consumed token reads as not found and no
        // duplicate membership appears.
        let error = fx
            .service
            .accept_invitation(&token, "new.user@example.com")
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
        let members = fx
            .members
            .list_by_project(fx.project.project_id)
            .await
            .unwrap();
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn unknown_token_reads_as_not_found() {
        let fx = fixture().await;
        seed_user(&fx, "oauth|r", "Recipient", "someone@example.com").await;

        let error = fx
            .service
            .accept_invitation("no-such-token", "someone@example.com")
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn expired_invitation_is_rejected_even_while_pending() {
        let fx = fixture().await;
        seed_user(&fx, "oauth|r", "Recipient", "late@example.com").await;

        // Created more than a week ago: still PENDING in storage, but past
        // its expiry.
        let stale = ProjectInvitation::new_pending(
            fx.project.project_id,
            "late@example.com",
            fx.owner.user_id,
            Utc::now() - ChronoDuration::days(INVITATION_TTL_DAYS + 1),
        );
        fx.invitations.create(&stale).await.unwrap();

        let error = fx
            .service
            .accept_invitation(&stale.token, "late@example.com")
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::GONE);
        assert!(
            fx.invitations
                .find_pending_by_token(&stale.token)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn mismatched_session_email_is_rejected_with_both_addresses() {
        let fx = fixture().await;
        seed_user(&fx, "oauth|r", "Wrong Inbox", "b@x.com").await;

        fx.service
            .process_invite(fx.project.project_id, "a@x.com", &fx.owner.email)
            .await
            .unwrap();
        let token = fx.dispatcher.sent()[0].token.clone();

        let error = fx
            .service
            .accept_invitation(&token, "b@x.com")
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::FORBIDDEN);
        let details = error.details().expect("details expected");
        assert!(details.contains("a@x.com"));
        assert!(details.contains("b@x.com"));
    }

    #[tokio::test]
    async fn accepting_while_already_member_closes_the_invitation_idempotently() {
        let fx = fixture().await;

        fx.service
            .process_invite(fx.project.project_id, "joined@example.com", &fx.owner.email)
            .await
            .unwrap();
        let token = fx.dispatcher.sent()[0].token.clone();

        // The recipient ends up on the team through another path before
        // clicking the link.
        let recipient = seed_user(&fx, "oauth|r", "Recipient", "joined@example.com").await;
        fx.members
            .insert(&TeamMember {
                project_id: fx.project.project_id,
                user_id: recipient.user_id,
                member_email: recipient.email.clone(),
                added_at: Utc::now(),
            })
            .await
            .unwrap();

        let accepted = fx
            .service
            .accept_invitation(&token, "joined@example.com")
            .await
            .unwrap();

        assert_eq!(accepted.project_id, fx.project.project_id);
        assert!(
            fx.invitations
                .find_pending_by_token(&token)
                .await
                .unwrap()
                .is_none()
        );
        let members = fx
            .members
            .list_by_project(fx.project.project_id)
            .await
            .unwrap();
        assert_eq!(members.len(), 2);
    }
}
