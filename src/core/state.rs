//! Application state
//!
//! Holds the store handles, the identity resolver and the invitation
//! orchestrator shared by every route and middleware. Stores are trait
//! objects so that the MySQL and in-memory backends are interchangeable;
//! the one configured pool is injected here at startup and nowhere else.

use crate::core::config::Config;
use crate::core::identity::IdentityResolver;
use crate::email::NotificationDispatcher;
use crate::invites::InvitationService;
use crate::repositories::{
    InvitationStore, MembershipStore, MySqlInvitationStore, MySqlMembershipStore,
    MySqlProjectStore, MySqlStepStore, MySqlUserStore, ProjectStore, StepStore, UserStore,
};
use sqlx::MySqlPool;
use std::sync::Arc;

pub struct AppState {
    pub user: Arc<dyn UserStore>,
    pub project: Arc<dyn ProjectStore>,
    pub step: Arc<dyn StepStore>,
    pub member: Arc<dyn MembershipStore>,
    pub invitation: Arc<dyn InvitationStore>,

    /// Maps session claims to user records.
    pub identity: IdentityResolver,

    /// The invitation workflow orchestrator.
    pub invites: InvitationService,

    /// Secret key for session tokens.
    pub jwt_secret: String,
}

impl AppState {
    /// Production wiring: every store backed by the given MySQL pool.
    pub fn new(
        pool: MySqlPool,
        config: &Config,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self::with_stores(
            Arc::new(MySqlUserStore::new(pool.clone())),
            Arc::new(MySqlProjectStore::new(pool.clone())),
            Arc::new(MySqlStepStore::new(pool.clone())),
            Arc::new(MySqlMembershipStore::new(pool.clone())),
            Arc::new(MySqlInvitationStore::new(pool)),
            dispatcher,
            config.jwt_secret.clone(),
        )
    }

    /// Explicit wiring over arbitrary store implementations; the test
    /// suites use this with the in-memory backend.
    pub fn with_stores(
        user: Arc<dyn UserStore>,
        project: Arc<dyn ProjectStore>,
        step: Arc<dyn StepStore>,
        member: Arc<dyn MembershipStore>,
        invitation: Arc<dyn InvitationStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        jwt_secret: String,
    ) -> Self {
        let identity = IdentityResolver::new(user.clone());
        let invites = InvitationService::new(
            user.clone(),
            project.clone(),
            member.clone(),
            invitation.clone(),
            dispatcher,
        );

        Self {
            user,
            project,
            step,
            member,
            invitation,
            identity,
            invites,
            jwt_secret,
        }
    }
}
