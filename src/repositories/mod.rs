//! Repositories module - persistence for every collection
//!
//! Each collection is fronted by an object-safe store trait (`traits`);
//! the MySQL implementations live in their own sub-modules and an
//! in-memory backend (`memory`) backs the test suites.

pub mod invitation;
pub mod memory;
pub mod project;
pub mod step;
pub mod team_member;
pub mod traits;
pub mod user;

pub use traits::{InvitationStore, MembershipStore, ProjectStore, StepStore, UserStore};

pub use invitation::MySqlInvitationStore;
pub use project::MySqlProjectStore;
pub use step::MySqlStepStore;
pub use team_member::MySqlMembershipStore;
pub use user::MySqlUserStore;
