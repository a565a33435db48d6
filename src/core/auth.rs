//! Session token handling and request guards
//!
//! The OAuth dance itself happens in an external provider; what reaches
//! this server is its terminal artifact, a signed session JWT carrying the
//! provider's subject claim and the account email. The middleware here
//! validates that token and resolves it to an internal user record.

use crate::core::{AppError, AppState};
use crate::entities::{Project, User};
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Claims inside a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    /// Subject: the auth provider's opaque identity claim.
    pub sub: String,
    pub email: String,
    /// Display name claim, when the provider supplies one.
    #[serde(default)]
    pub name: Option<String>,
}

/// Issues a session token. Used by tests and local tooling; in production
/// the external session layer mints these after the OAuth callback.
#[instrument(skip(secret, sub, email, name))]
pub fn encode_session_token(
    sub: &str,
    email: &str,
    name: Option<&str>,
    secret: &str,
) -> Result<String, AppError> {
    let now = Utc::now();
    let expire = Duration::hours(24);
    let claims = Claims {
        iat: now.timestamp() as usize,
        exp: (now + expire).timestamp() as usize,
        sub: sub.to_owned(),
        email: email.to_owned(),
        name: name.map(|value| value.to_owned()),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| {
        warn!("failed to encode session token: {:?}", e);
        AppError::internal_server_error("Failed to issue session token")
    })
}

#[instrument(skip(token, secret))]
pub fn decode_session_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!("failed to decode session token: {:?}", e);
        AppError::unauthorized("Unable to decode session token")
    })
}

/// Validates the bearer token and resolves the principal to a user record
/// (created on first sign-in). The resolved `User` is stored as a request
/// extension for the handlers.
#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::unauthorized("Invalid authorization header")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::unauthorized(
                "Please add the session token to the header",
            ));
        }
    };

    let token = auth_header
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| AppError::unauthorized("Expected a bearer token"))?;

    let claims = decode_session_token(token, &state.jwt_secret)?;

    let current_user = state.identity.resolve(&claims).await?;
    info!("User authenticated: {}", current_user.user_id);

    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Verifies that the current user is a member of the project named in the
/// path and stores the membership row as a request extension.
#[instrument(skip(state, req, next))]
pub async fn project_membership_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running project membership middleware");
    let current_user = req
        .extensions()
        .get::<User>()
        .ok_or_else(|| {
            warn!("User not found in request extensions");
            AppError::unauthorized("User not authenticated")
        })?
        .clone();

    // First numeric path segment is the project id.
    let project_id: i32 = req
        .uri()
        .path()
        .split('/')
        .find_map(|segment| segment.parse::<i32>().ok())
        .ok_or_else(|| {
            warn!("Project ID not found in path: {}", req.uri().path());
            AppError::bad_request("Project ID not found in path")
        })?;

    debug!(
        "Checking membership for user {} in project {}",
        current_user.user_id, project_id
    );

    let membership = state
        .member
        .find(project_id, current_user.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            warn!(
                "User {} is not a member of project {}",
                current_user.user_id, project_id
            );
            AppError::forbidden("You are not a member of this project")
        })?;

    req.extensions_mut().insert(membership);
    Ok(next.run(req).await)
}

/// Owner gate for destructive project operations.
pub fn require_owner(project: &Project, user: &User) -> Result<(), AppError> {
    if project.owner_id != user.user_id {
        warn!(
            "User {} is not the owner of project {}",
            user.user_id, project.project_id
        );
        return Err(AppError::forbidden(
            "Only the project owner can perform this action",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_round_trips() {
        let secret = "unit-test-secret";
        let token =
            encode_session_token("oauth|abc123", "Person@Example.com", Some("Person"), secret)
                .expect("encode token");

        let claims = decode_session_token(&token, secret).expect("decode token");
        assert_eq!(claims.sub, "oauth|abc123");
        assert_eq!(claims.email, "Person@Example.com");
        assert_eq!(claims.name.as_deref(), Some("Person"));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = encode_session_token("oauth|abc123", "a@x.com", None, "secret-a")
            .expect("encode token");

        let result = decode_session_token(&token, "secret-b");
        assert!(result.is_err());
    }
}
