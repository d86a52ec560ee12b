use crate::error::ApiError;
use crate::state::AppState;
use crate::web::api::middleware::AuthUser;
use crate::web::api::parse_uuid_param;
use atelier_common::models::component::{Category, ComponentSort, PreviewTheme};
use atelier_db::{ComponentRepo, ComponentRow, ComponentUpdate, NewComponent};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use uuid::Uuid;

pub(crate) fn component_json(row: &ComponentRow) -> JsonValue {
    json!({
        "component_id": row.component_id,
        "title": row.title,
        "slug": row.slug,
        "description": row.description,
        "code": row.code,
        "category": row.category,
        "is_public": row.is_public,
        "is_visible": row.is_visible,
        "owner": { "user_id": row.owner_id, "name": row.owner_name },
        "views": row.views,
        "copies": row.copies,
        "preview_image": row.preview_image,
        "preview_settings": {
            "theme": row.preview_theme,
            "use_house_theme": row.use_house_theme,
        },
        "props_schema": row.props_schema,
        "tags": row.tags,
        "like_count": row.like_count,
        "save_count": row.save_count,
        "created_at": row.created_at,
        "updated_at": row.updated_at,
    })
}

fn component_json_with_flags(row: &ComponentRow, is_liked: bool, is_saved: bool) -> JsonValue {
    let mut value = component_json(row);
    value["is_liked"] = json!(is_liked);
    value["is_saved"] = json!(is_saved);
    value
}

/// Partial preview settings from a request body; unset fields fall back
/// to defaults (create) or the stored values (update).
#[derive(Debug, Default, Deserialize)]
pub struct PreviewSettingsPayload {
    pub theme: Option<String>,
    pub use_house_theme: Option<bool>,
}

fn parse_theme(raw: Option<&str>, fallback: PreviewTheme) -> Result<PreviewTheme, ApiError> {
    match raw {
        Some(s) => s.parse().map_err(ApiError::Validation),
        None => Ok(fallback),
    }
}

/// Category filter for the public listing: "all" (any case) and blank
/// disable the filter; known values are normalized to their canonical
/// spelling; unknown values pass through and simply match nothing.
fn normalize_category_filter(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return None;
    }
    Some(match raw.parse::<Category>() {
        Ok(c) => c.as_str().to_string(),
        Err(_) => raw.to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

/// GET /api/components - public listing
#[tracing::instrument(skip(state))]
pub async fn list_public(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = normalize_category_filter(query.category.as_deref());
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let sort = query
        .sort
        .as_deref()
        .and_then(|s| s.parse::<ComponentSort>().ok())
        .unwrap_or_default();

    let rows = ComponentRepo::list_public(&state.pool, category.as_deref(), search, sort).await?;
    Ok(Json(rows.iter().map(component_json).collect::<Vec<_>>()))
}

/// GET /api/components/:id - single read. Increments the view counter on
/// every successful fetch, so repeated reads are deliberately
/// non-idempotent.
#[tracing::instrument(skip(state, user))]
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: Option<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let component_id = parse_uuid_param(&id, "component")?;
    let mut row = ComponentRepo::get(&state.pool, component_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Component not found"))?;

    let caller = user.as_ref().and_then(|u| u.0.sub.parse::<Uuid>().ok());
    let is_owner = caller == Some(row.owner_id);
    if !row.is_public && !is_owner {
        return Err(ApiError::forbidden("This component is private"));
    }
    // Admin-hidden components are not resolvable on the public path
    if !row.is_visible && !is_owner {
        return Err(ApiError::not_found("Component not found"));
    }

    ComponentRepo::increment_views(&state.pool, component_id).await?;
    row.views += 1;

    let (is_liked, is_saved) = match caller {
        Some(user_id) => ComponentRepo::membership(&state.pool, component_id, user_id).await?,
        None => (false, false),
    };

    Ok(Json(component_json_with_flags(&row, is_liked, is_saved)))
}

#[derive(Debug, Deserialize)]
pub struct CreateComponentRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: String,
    pub category: Option<String>,
    pub is_public: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub preview_image: Option<String>,
    pub preview_settings: Option<PreviewSettingsPayload>,
    pub props_schema: Option<JsonValue>,
}

/// POST /api/components
#[tracing::instrument(skip(state, auth, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<CreateComponentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = auth.user_id()?;

    if req.title.trim().is_empty() || req.description.trim().is_empty() || req.code.trim().is_empty()
    {
        return Err(ApiError::validation(
            "Title, description, and code are required",
        ));
    }

    let category = match req.category.as_deref() {
        Some(c) if !c.trim().is_empty() => c.parse::<Category>().map_err(ApiError::Validation)?,
        _ => Category::default(),
    };
    let settings = req.preview_settings.unwrap_or_default();
    let theme = parse_theme(settings.theme.as_deref(), PreviewTheme::default())?;
    let props_schema = match req.props_schema {
        Some(v) if !v.is_object() => {
            return Err(ApiError::validation("props_schema must be an object"))
        }
        Some(v) => v,
        None => json!({}),
    };
    let tags = req.tags.unwrap_or_default();

    let row = ComponentRepo::create(
        &state.pool,
        &NewComponent {
            title: req.title.trim(),
            description: &req.description,
            code: &req.code,
            category: category.as_str(),
            is_public: req.is_public.unwrap_or(true),
            owner_id,
            tags: &tags,
            preview_image: req.preview_image.as_deref(),
            preview_theme: theme.as_str(),
            use_house_theme: settings.use_house_theme.unwrap_or(true),
            props_schema: &props_schema,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(component_json(&row))))
}

#[derive(Debug, Deserialize)]
pub struct UpdateComponentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
    pub is_public: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub preview_settings: Option<PreviewSettingsPayload>,
    pub props_schema: Option<JsonValue>,
}

/// PUT /api/components/:id - owner-only content update. A changed title
/// regenerates the slug through the same unique-suffix loop as creation.
#[tracing::instrument(skip(state, auth, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateComponentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let component_id = parse_uuid_param(&id, "component")?;
    let row = ComponentRepo::get(&state.pool, component_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Component not found"))?;

    if auth.user_id()? != row.owner_id {
        return Err(ApiError::forbidden(
            "Not authorized to update this component",
        ));
    }

    // Blank strings read as "unchanged", matching the upload form
    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&row.title);
    let description = req
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(&row.description);
    let code = req
        .code
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(&row.code);
    let category = match req.category.as_deref() {
        Some(c) if !c.trim().is_empty() => c
            .parse::<Category>()
            .map_err(ApiError::Validation)?
            .as_str()
            .to_string(),
        _ => row.category.clone(),
    };
    let settings = req.preview_settings.unwrap_or_default();
    let current_theme = row.preview_theme.parse::<PreviewTheme>().unwrap_or_default();
    let theme = parse_theme(settings.theme.as_deref(), current_theme)?;
    let props_schema = match req.props_schema {
        Some(v) if !v.is_object() => {
            return Err(ApiError::validation("props_schema must be an object"))
        }
        Some(v) => v,
        None => row.props_schema.clone(),
    };
    let tags = req.tags.unwrap_or_else(|| row.tags.clone());
    let regenerate_slug = title != row.title;

    let updated = ComponentRepo::update(
        &state.pool,
        component_id,
        &ComponentUpdate {
            title,
            description,
            code,
            category: &category,
            is_public: req.is_public.unwrap_or(row.is_public),
            is_visible: row.is_visible,
            tags: &tags,
            preview_image: row.preview_image.as_deref(),
            preview_theme: theme.as_str(),
            use_house_theme: settings.use_house_theme.unwrap_or(row.use_house_theme),
            props_schema: &props_schema,
            regenerate_slug,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Component not found"))?;

    Ok(Json(component_json(&updated)))
}

/// DELETE /api/components/:id - owner or admin
#[tracing::instrument(skip(state, auth))]
pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let component_id = parse_uuid_param(&id, "component")?;
    let row = ComponentRepo::get(&state.pool, component_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Component not found"))?;

    if !auth.0.is_admin() && auth.user_id()? != row.owner_id {
        return Err(ApiError::forbidden(
            "Not authorized to delete this component",
        ));
    }

    ComponentRepo::delete(&state.pool, component_id).await?;
    Ok(Json(json!({"message": "Component deleted successfully"})))
}

/// POST /api/components/:id/like - idempotent membership toggle
#[tracing::instrument(skip(state, auth))]
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let component_id = parse_uuid_param(&id, "component")?;
    let user_id = auth.user_id()?;
    if !ComponentRepo::exists(&state.pool, component_id).await? {
        return Err(ApiError::not_found("Component not found"));
    }

    let (is_liked, like_count) = ComponentRepo::toggle_like(&state.pool, component_id, user_id).await?;
    Ok(Json(json!({
        "message": if is_liked { "Component liked" } else { "Component unliked" },
        "like_count": like_count,
        "is_liked": is_liked,
    })))
}

/// POST /api/components/:id/save - identical structure to like
#[tracing::instrument(skip(state, auth))]
pub async fn toggle_save(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let component_id = parse_uuid_param(&id, "component")?;
    let user_id = auth.user_id()?;
    if !ComponentRepo::exists(&state.pool, component_id).await? {
        return Err(ApiError::not_found("Component not found"));
    }

    let (is_saved, save_count) = ComponentRepo::toggle_save(&state.pool, component_id, user_id).await?;
    Ok(Json(json!({
        "message": if is_saved { "Component saved" } else { "Component unsaved" },
        "save_count": save_count,
        "is_saved": is_saved,
    })))
}

/// POST /api/components/:id/copy - advisory counter, no per-user dedup
#[tracing::instrument(skip(state, _auth))]
pub async fn increment_copy(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let component_id = parse_uuid_param(&id, "component")?;
    let copies = ComponentRepo::increment_copies(&state.pool, component_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Component not found"))?;
    Ok(Json(json!({
        "message": "Copy count incremented",
        "copies": copies,
    })))
}

/// GET /api/components/user/my-components
#[tracing::instrument(skip(state, auth))]
pub async fn my_components(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = ComponentRepo::list_by_owner(&state.pool, auth.user_id()?).await?;
    Ok(Json(rows.iter().map(component_json).collect::<Vec<_>>()))
}

/// GET /api/components/user/likes
#[tracing::instrument(skip(state, auth))]
pub async fn my_likes(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = ComponentRepo::list_liked_by(&state.pool, auth.user_id()?).await?;
    Ok(Json(rows.iter().map(component_json).collect::<Vec<_>>()))
}

/// GET /api/components/user/saves
#[tracing::instrument(skip(state, auth))]
pub async fn my_saves(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = ComponentRepo::list_saved_by(&state.pool, auth.user_id()?).await?;
    Ok(Json(rows.iter().map(component_json).collect::<Vec<_>>()))
}
