//! Invitation workflow
//!
//! The coordination layer for inviting collaborators into a project and
//! accepting those invitations: identity resolution against known users,
//! direct membership for existing accounts, token-based invitations for
//! unknown addresses, and the one-way pending → accepted transition.

mod outcome;
mod service;

pub use outcome::{AcceptedInvitation, InviteOutcome, InviteSkipReason};
pub use service::{DISPATCH_TIMEOUT_SECS, InvitationService};
