/// HTTP handlers for blog endpoints
///
/// - Posts: list (paginated), create, retrieve, update, delete
/// - Groups: list and retrieve
/// - Comments: CRUD nested under a post
/// - Follows: list with search, create
/// - JWT: obtain, refresh, verify
/// - Users: registration
pub mod comments;
pub mod follows;
pub mod groups;
pub mod health;
pub mod jwt;
pub mod posts;
pub mod users;

use actix_web::{http::StatusCode, HttpRequest, HttpResponse};

/// Links to the collection endpoints under `/v1/`
pub async fn api_root(req: HttpRequest) -> HttpResponse {
    let info = req.connection_info();
    let base = format!("{}://{}/v1", info.scheme(), info.host());
    HttpResponse::Ok().json(serde_json::json!({
        "posts": format!("{base}/posts/"),
        "groups": format!("{base}/groups/"),
        "follow": format!("{base}/follow/"),
    }))
}

/// Fallback for a known resource hit with an unsupported method
pub async fn method_not_allowed(req: HttpRequest) -> HttpResponse {
    let status = StatusCode::METHOD_NOT_ALLOWED;
    HttpResponse::build(status).json(serde_json::json!({
        "error": format!("Method \"{}\" not allowed.", req.method()),
        "status": status.as_u16(),
    }))
}

/// Fallback for paths that do not route
pub async fn not_found() -> HttpResponse {
    let status = StatusCode::NOT_FOUND;
    HttpResponse::build(status).json(serde_json::json!({
        "error": "Not found.",
        "status": status.as_u16(),
    }))
}
