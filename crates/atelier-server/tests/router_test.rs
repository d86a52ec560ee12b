use atelier_server::auth::create_user_token;
use atelier_server::config::{AdminConfig, AuthConfig, CorsConfig, DbConfig, ServerConfig};
use atelier_server::state::AppState;
use atelier_server::web::build_router;
use axum::body::Body;
use axum::Router;
use http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

const JWT_SECRET: &str = "test-jwt-secret";

fn test_config() -> ServerConfig {
    ServerConfig {
        listen: "127.0.0.1:0".to_string(),
        db: DbConfig {
            url: "postgres://invalid:5432/db".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            admin: AdminConfig {
                username: "admin".to_string(),
                password: "admin-pw".to_string(),
            },
        },
        cors: CorsConfig::default(),
        cdn: None,
    }
}

/// Router over a lazily-connected pool: routes that reject before
/// touching the database exercise the real middleware and handlers
/// without a server.
fn test_router() -> Router {
    let pool = PgPool::connect_lazy("postgres://invalid:5432/db").unwrap();
    build_router(AppState::new(pool, test_config()))
}

async fn send(
    router: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn user_token() -> String {
    create_user_token(Uuid::new_v4(), "user@example.com", JWT_SECRET).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(test_router(), Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn test_register_rejects_malformed_email() {
    let (status, body) = send(
        test_router(),
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"name": "Ada", "email": "not-an-email", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Valid email required"));
}

#[tokio::test]
async fn test_register_rejects_short_name_and_password() {
    let (status, body) = send(
        test_router(),
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"name": "A", "email": "ada@example.com", "password": "123"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    // First failure wins the message slot
    assert_eq!(body["error"], json!("Name must be at least 2 characters"));
}

#[tokio::test]
async fn test_login_requires_password() {
    let (status, body) = send(
        test_router(),
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "ada@example.com", "password": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Password required"));
}

#[tokio::test]
async fn test_me_requires_token() {
    let (status, body) = send(test_router(), Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Missing authorization header"));
}

#[tokio::test]
async fn test_me_rejects_garbage_token() {
    let (status, body) = send(
        test_router(),
        Method::GET,
        "/api/auth/me",
        Some("garbage"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Invalid or expired token"));
}

#[tokio::test]
async fn test_me_rejects_token_signed_with_other_secret() {
    let token = create_user_token(Uuid::new_v4(), "a@b.com", "other-secret").unwrap();
    let (status, _) = send(
        test_router(),
        Method::GET,
        "/api/auth/me",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_component_requires_auth() {
    let (status, _) = send(
        test_router(),
        Method::POST,
        "/api/components",
        None,
        Some(json!({"title": "X", "description": "Y", "code": "Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_copy_requires_auth() {
    let (status, _) = send(
        test_router(),
        Method::POST,
        &format!("/api/components/{}/copy", Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_component_id_must_be_uuid() {
    // Path validation runs before any database access
    let (status, body) = send(
        test_router(),
        Method::GET,
        "/api/components/not-a-uuid",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid component ID"));
}

#[tokio::test]
async fn test_admin_login_rejects_bad_credentials() {
    let (status, body) = send(
        test_router(),
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({"username": "admin", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Invalid admin credentials"));
}

#[tokio::test]
async fn test_admin_login_issues_admin_token() {
    let (status, body) = send(
        test_router(),
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({"username": "admin", "password": "admin-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admin"]["role"], json!("admin"));

    // The issued token passes the admin extractor: a bad path id then
    // fails validation (400) rather than auth (401/403)
    let token = body["token"].as_str().unwrap().to_string();
    let (status, body) = send(
        test_router(),
        Method::DELETE,
        "/api/admin/components/not-a-uuid",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid component ID"));
}

#[tokio::test]
async fn test_admin_routes_reject_missing_token() {
    let (status, _) = send(test_router(), Method::GET, "/api/admin/analytics", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_user_tokens() {
    // A valid session token without the role claim is forbidden, not
    // unauthorized
    let token = user_token();
    let (status, body) = send(
        test_router(),
        Method::GET,
        "/api/admin/analytics",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("Access denied. Admin only"));
}

#[tokio::test]
async fn test_feedback_requires_message() {
    let token = user_token();
    let (status, body) = send(
        test_router(),
        Method::POST,
        "/api/feedback",
        Some(&token),
        Some(json!({"message": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Message is required"));
}

#[tokio::test]
async fn test_feedback_rejects_out_of_range_rating() {
    let token = user_token();
    let (status, body) = send(
        test_router(),
        Method::POST,
        "/api/feedback",
        Some(&token),
        Some(json!({"message": "Nice", "rating": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Rating must be between 1 and 5"));
}

#[tokio::test]
async fn test_upload_requires_auth() {
    let (status, _) = send(test_router(), Method::POST, "/api/upload/image", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
