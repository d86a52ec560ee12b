use crate::auth::create_admin_token;
use crate::error::ApiError;
use crate::state::AppState;
use crate::web::api::components::component_json;
use crate::web::api::middleware::AdminUser;
use crate::web::api::parse_uuid_param;
use atelier_common::models::component::{Category, PreviewTheme};
use atelier_db::{AdminListParams, AnalyticsRepo, ComponentRepo, ComponentUpdate};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/admin/login - fixed credential pair from configuration.
/// No user record is involved; the token alone carries the role.
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let admin = &state.config.auth.admin;
    if req.username != admin.username || req.password != admin.password {
        return Err(ApiError::unauthorized("Invalid admin credentials"));
    }

    let token = create_admin_token(&admin.username, &state.config.auth.jwt_secret)?;
    Ok(Json(json!({
        "message": "Admin login successful",
        "token": token,
        "admin": { "username": admin.username, "role": "admin" },
    })))
}

/// GET /api/admin/analytics - read-only dashboard aggregates
#[tracing::instrument(skip(state, _admin))]
pub async fn analytics(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let (total, visible) = AnalyticsRepo::counts(&state.pool).await?;
    let most_viewed = AnalyticsRepo::top_viewed(&state.pool, 5).await?;
    let categories = AnalyticsRepo::category_distribution(&state.pool).await?;
    let trend = AnalyticsRepo::upload_trend(&state.pool).await?;
    let recent = AnalyticsRepo::recent(&state.pool, 5).await?;

    Ok(Json(json!({
        "total_components": total,
        "active_components": visible,
        "most_viewed": most_viewed
            .iter()
            .map(|r| json!({"title": r.title, "views": r.views, "category": r.category}))
            .collect::<Vec<_>>(),
        "category_distribution": categories
            .iter()
            .map(|r| json!({"category": r.category, "count": r.count}))
            .collect::<Vec<_>>(),
        "upload_trends": trend
            .iter()
            .map(|r| json!({"day": r.day, "count": r.count}))
            .collect::<Vec<_>>(),
        "recent_components": recent
            .iter()
            .map(|r| json!({
                "component_id": r.component_id,
                "title": r.title,
                "category": r.category,
                "owner_name": r.owner_name,
                "created_at": r.created_at,
            }))
            .collect::<Vec<_>>(),
    })))
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

fn default_sort_by() -> String {
    "created_at".to_string()
}

fn default_order() -> String {
    "desc".to_string()
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub limit: i64,
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_order")]
    pub order: String,
}

/// GET /api/admin/components - moderation listing over all rows,
/// private and hidden included
#[tracing::instrument(skip(state, _admin))]
pub async fn list_components(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (rows, total) = ComponentRepo::admin_list(
        &state.pool,
        &AdminListParams {
            search,
            category,
            sort_by: &query.sort_by,
            descending: !query.order.eq_ignore_ascii_case("asc"),
            limit,
            offset: (page - 1) * limit,
        },
    )
    .await?;

    Ok(Json(json!({
        "components": rows.iter().map(component_json).collect::<Vec<_>>(),
        "current_page": page,
        "total_pages": (total + limit - 1) / limit,
        "total_components": total,
    })))
}

#[derive(Debug, Deserialize)]
pub struct AdminUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
    pub is_public: Option<bool>,
    pub is_visible: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub preview_image: Option<String>,
    pub preview_theme: Option<String>,
    pub use_house_theme: Option<bool>,
    pub props_schema: Option<JsonValue>,
}

/// PUT /api/admin/components/:id - moderation update, any field, no
/// ownership requirement
#[tracing::instrument(skip(state, _admin, req))]
pub async fn update_component(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<AdminUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let component_id = parse_uuid_param(&id, "component")?;
    let row = ComponentRepo::get(&state.pool, component_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Component not found"))?;

    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&row.title);
    let description = req.description.as_deref().unwrap_or(&row.description);
    let code = req.code.as_deref().unwrap_or(&row.code);
    let category = match req.category.as_deref() {
        Some(c) if !c.trim().is_empty() => c
            .parse::<Category>()
            .map_err(ApiError::Validation)?
            .as_str()
            .to_string(),
        _ => row.category.clone(),
    };
    let theme = match req.preview_theme.as_deref() {
        Some(t) => t.parse::<PreviewTheme>().map_err(ApiError::Validation)?,
        None => row.preview_theme.parse().unwrap_or_default(),
    };
    let props_schema = match req.props_schema {
        Some(v) if !v.is_object() => {
            return Err(ApiError::validation("props_schema must be an object"))
        }
        Some(v) => v,
        None => row.props_schema.clone(),
    };
    let tags = req.tags.unwrap_or_else(|| row.tags.clone());
    let preview_image = match &req.preview_image {
        Some(url) => Some(url.as_str()),
        None => row.preview_image.as_deref(),
    };
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
            is_visible: req.is_visible.unwrap_or(row.is_visible),
            tags: &tags,
            preview_image,
            preview_theme: theme.as_str(),
            use_house_theme: req.use_house_theme.unwrap_or(row.use_house_theme),
            props_schema: &props_schema,
            regenerate_slug,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Component not found"))?;

    Ok(Json(json!({
        "message": "Component updated successfully",
        "component": component_json(&updated),
    })))
}

/// DELETE /api/admin/components/:id
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_component(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let component_id = parse_uuid_param(&id, "component")?;
    if !ComponentRepo::delete(&state.pool, component_id).await? {
        return Err(ApiError::not_found("Component not found"));
    }
    Ok(Json(json!({"message": "Component deleted successfully"})))
}

/// PATCH /api/admin/components/:id/toggle-visibility - flips the
/// admin-only visibility axis, orthogonal to the owner's public flag
#[tracing::instrument(skip(state, _admin))]
pub async fn toggle_visibility(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let component_id = parse_uuid_param(&id, "component")?;
    let is_visible = ComponentRepo::toggle_visibility(&state.pool, component_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Component not found"))?;

    let message = if is_visible {
        "Component shown successfully"
    } else {
        "Component hidden successfully"
    };
    Ok(Json(json!({"message": message, "is_visible": is_visible})))
}
