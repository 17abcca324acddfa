/// Comment handlers - comments nested under `/posts/{post_id}/comments/`
use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::CommentPayload;
use crate::services::{CommentService, UpdateMode};
use crate::AppState;

pub async fn list_comments(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = CommentService::new(state.store.clone());
    let comments = service.list_comments(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn create_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<i64>,
    body: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    let service = CommentService::new(state.store.clone());
    let comment = service
        .create_comment(&user, post_id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn get_comment(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new(state.store.clone());
    let comment = service.get_comment(post_id, comment_id).await?;
    Ok(HttpResponse::Ok().json(comment))
}

async fn update(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    (post_id, comment_id): (i64, i64),
    payload: CommentPayload,
    mode: UpdateMode,
) -> Result<HttpResponse> {
    let service = CommentService::new(state.store.clone());
    let comment = service
        .update_comment(user.as_ref(), post_id, comment_id, payload, mode)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

pub async fn update_comment(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<(i64, i64)>,
    body: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    update(state, user, path.into_inner(), body.into_inner(), UpdateMode::Full).await
}

pub async fn partial_update_comment(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<(i64, i64)>,
    body: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    update(state, user, path.into_inner(), body.into_inner(), UpdateMode::Partial).await
}

pub async fn delete_comment(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new(state.store.clone());
    service
        .delete_comment(user.as_ref(), post_id, comment_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
