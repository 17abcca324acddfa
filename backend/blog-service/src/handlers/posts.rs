/// Post handlers - HTTP endpoints for post operations
use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::Result;
use crate::models::PostPayload;
use crate::pagination::LimitOffset;
use crate::services::{PostService, UpdateMode};
use crate::AppState;

/// List posts; paginated when a limit applies, otherwise a bare array
pub async fn list_posts(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());

    match LimitOffset::from_request(&req, &state.pagination) {
        Some(page) => {
            let count = service.count_posts().await?;
            let posts = service.list_posts(Some(page.window())).await?;
            Ok(HttpResponse::Ok().json(page.page(count, posts)))
        }
        None => {
            let posts = service.list_posts(None).await?;
            Ok(HttpResponse::Ok().json(posts))
        }
    }
}

/// Create a new post authored by the caller
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PostPayload>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service.create_post(&user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID
pub async fn get_post(state: web::Data<AppState>, post_id: web::Path<i64>) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service.get_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

async fn update(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    post_id: i64,
    payload: PostPayload,
    mode: UpdateMode,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service
        .update_post(user.as_ref(), post_id, payload, mode)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT: replace the post's editable fields
pub async fn update_post(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    post_id: web::Path<i64>,
    body: web::Json<PostPayload>,
) -> Result<HttpResponse> {
    update(state, user, post_id.into_inner(), body.into_inner(), UpdateMode::Full).await
}

/// PATCH: change only the supplied fields
pub async fn partial_update_post(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    post_id: web::Path<i64>,
    body: web::Json<PostPayload>,
) -> Result<HttpResponse> {
    update(state, user, post_id.into_inner(), body.into_inner(), UpdateMode::Partial).await
}

/// Delete a post and its comments
pub async fn delete_post(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    service.delete_post(user.as_ref(), post_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
