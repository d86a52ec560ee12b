use crate::auth::validate_token;
use crate::error::ApiError;
use crate::state::AppState;
use atelier_common::models::auth::Claims;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;
use uuid::Uuid;

/// Extractor that validates a JWT Bearer token and provides the claims.
/// Use `Option<AuthUser>` for optional auth (unauthenticated access allowed).
/// Use `AuthUser` directly for required auth.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The caller's user id. Fails for admin tokens, whose subject is the
    /// configured username rather than a user row.
    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        self.0
            .sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid user ID in token"))
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid authorization header format"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization header format"))?;
    Ok(Some(token))
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;
        let claims = validate_token(token, &state.config.auth.jwt_secret)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;
        Ok(AuthUser(claims))
    }
}

impl OptionalFromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    /// Optional variant: absent or unusable credentials read as anonymous
    /// instead of rejecting, so public endpoints stay reachable.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts) {
            Ok(Some(token)) => Ok(validate_token(token, &state.config.auth.jwt_secret)
                .ok()
                .map(AuthUser)),
            _ => Ok(None),
        }
    }
}

/// Extractor for admin-only endpoints: signature + role claim, nothing
/// else. A valid non-admin token is a 403, anything less a 401.
#[derive(Debug)]
pub struct AdminUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| ApiError::unauthorized("Access denied. No token provided"))?;
        let claims = validate_token(token, &state.config.auth.jwt_secret)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;
        if !claims.is_admin() {
            return Err(ApiError::forbidden("Access denied. Admin only"));
        }
        Ok(AdminUser(claims))
    }
}
