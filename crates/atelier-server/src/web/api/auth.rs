use crate::auth::{create_user_token, hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::web::api::middleware::AuthUser;
use atelier_db::{UserRepo, UserRow};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn user_json(user: &UserRow) -> serde_json::Value {
    json!({
        "user_id": user.user_id,
        "name": user.name,
        "email": user.email,
        "created_at": user.created_at,
    })
}

/// POST /api/auth/register
#[tracing::instrument(skip(state, req))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors =
        atelier_common::validation::validate_register(&req.name, &req.email, &req.password);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors.remove(0)));
    }

    if UserRepo::get_by_email(&state.pool, &req.email).await?.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();
    UserRepo::create(&state.pool, user_id, req.name.trim(), &req.email, &password_hash).await?;

    let user = UserRepo::get_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("User missing after insert")))?;
    let token = create_user_token(user_id, &user.email, &state.config.auth.jwt_secret)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user_json(&user), "token": token })),
    ))
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = atelier_common::validation::validate_login(&req.email, &req.password);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors.remove(0)));
    }

    // Same message for unknown email and wrong password
    let user = UserRepo::get_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = create_user_token(user.user_id, &user.email, &state.config.auth.jwt_secret)?;
    Ok(Json(json!({ "user": user_json(&user), "token": token })))
}

/// GET /api/auth/me
#[tracing::instrument(skip(state))]
pub async fn me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id()?;
    let user = UserRepo::get_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(json!({ "user": user_json(&user) })))
}
