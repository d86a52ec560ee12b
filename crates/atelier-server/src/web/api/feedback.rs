use crate::error::ApiError;
use crate::state::AppState;
use crate::web::api::middleware::AuthUser;
use atelier_db::FeedbackRepo;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct CreateFeedbackRequest {
    #[serde(default)]
    pub message: String,
    pub rating: Option<i16>,
}

/// POST /api/feedback
#[tracing::instrument(skip(state, auth, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user_id()?;
    if req.message.trim().is_empty() {
        return Err(ApiError::validation("Message is required"));
    }
    if let Some(rating) = req.rating {
        if !(1..=5).contains(&rating) {
            return Err(ApiError::validation("Rating must be between 1 and 5"));
        }
    }

    let feedback_id =
        FeedbackRepo::create(&state.pool, user_id, req.message.trim(), req.rating).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Feedback submitted", "feedback_id": feedback_id})),
    ))
}

/// GET /api/feedback
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let rows = FeedbackRepo::list(&state.pool).await?;
    Ok(Json(
        rows.iter()
            .map(|r| {
                json!({
                    "feedback_id": r.feedback_id,
                    "user_name": r.user_name,
                    "message": r.message,
                    "rating": r.rating,
                    "created_at": r.created_at,
                })
            })
            .collect::<Vec<_>>(),
    ))
}
