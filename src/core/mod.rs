//! Core module - infrastructure shared by the whole application
//!
//! - session tokens and request guards
//! - identity resolution
//! - configuration
//! - error handling
//! - application state

pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod state;

pub use auth::{
    Claims, authentication_middleware, decode_session_token, encode_session_token,
    project_membership_middleware, require_owner,
};
pub use config::Config;
pub use error::AppError;
pub use identity::IdentityResolver;
pub use state::AppState;
