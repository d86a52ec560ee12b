use crate::error::ApiError;
use crate::state::AppState;
use crate::upload::{self, MAX_IMAGE_BYTES};
use crate::web::api::middleware::AuthUser;
use axum::{extract::Multipart, extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// POST /api/upload/image - multipart image proxied to the CDN.
/// The 5 MiB cap and image/* filter mirror the upload form's limits.
#[tracing::instrument(skip(state, _auth, multipart))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let cdn = state
        .config
        .cdn
        .as_ref()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("CDN not configured")))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("Malformed multipart payload"))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| ApiError::validation("Only image files are allowed"))?;
        if !content_type.starts_with("image/") {
            return Err(ApiError::validation("Only image files are allowed"));
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "preview".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::validation("Malformed multipart payload"))?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::validation("Image exceeds the 5 MiB limit"));
        }

        let url =
            upload::upload_image(&state.http, cdn, &file_name, &content_type, bytes.to_vec())
                .await?;
        return Ok(Json(json!({
            "message": "Image uploaded successfully",
            "url": url,
        })));
    }

    Err(ApiError::validation("No image file provided"))
}
