//! Query DTOs - query string parameters

use serde::{Deserialize, Serialize};

/// Parameters of the emailed acceptance link:
/// `/invite/accept?token=<token>&project=<projectId>`.
///
/// Only the token is authoritative; `project` is carried for client-side
/// routing and echoed back, never trusted.
#[derive(Serialize, Deserialize, Debug)]
pub struct AcceptInviteQuery {
    pub token: String,
    #[serde(default)]
    pub project: Option<i32>,
}
