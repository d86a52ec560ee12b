pub mod admin;
pub mod auth;
pub mod components;
pub mod feedback;
pub mod middleware;
pub mod uploads;

use crate::error::ApiError;
use crate::state::AppState;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// GET /api/health -- liveness probe
async fn health() -> impl IntoResponse {
    Json(json!({"ok": true}))
}

pub(crate) fn parse_uuid_param(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("Invalid {} ID", what)))
}

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Public component routes + authenticated CRUD
        .route("/components", get(components::list_public))
        .route("/components", post(components::create))
        .route("/components/{id}", get(components::get_one))
        .route("/components/{id}", put(components::update))
        .route("/components/{id}", delete(components::delete_one))
        // Interactions
        .route("/components/{id}/like", post(components::toggle_like))
        .route("/components/{id}/save", post(components::toggle_save))
        .route("/components/{id}/copy", post(components::increment_copy))
        // Caller collections
        .route(
            "/components/user/my-components",
            get(components::my_components),
        )
        .route("/components/user/likes", get(components::my_likes))
        .route("/components/user/saves", get(components::my_saves))
        // Admin routes
        .route("/admin/login", post(admin::login))
        .route("/admin/analytics", get(admin::analytics))
        .route("/admin/components", get(admin::list_components))
        .route("/admin/components/{id}", put(admin::update_component))
        .route("/admin/components/{id}", delete(admin::delete_component))
        .route(
            "/admin/components/{id}/toggle-visibility",
            patch(admin::toggle_visibility),
        )
        // Image uploads
        .route("/upload/image", post(uploads::upload_image))
        // Feedback
        .route("/feedback", get(feedback::list))
        .route("/feedback", post(feedback::create))
        .with_state(state)
}
