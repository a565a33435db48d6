//! Enumerations shared by the persisted entities

use serde::{Deserialize, Serialize};

/// Lifecycle of a project invitation.
///
/// `Pending` is the initial state, `Accepted` is terminal. Expiry is not a
/// stored state: an expired invitation stays `PENDING` in storage and is
/// filtered out at read time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
}
