/// Follow handlers - authenticated only
use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::models::FollowPayload;
use crate::services::FollowService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FollowQuery {
    pub search: Option<String>,
}

/// List the caller's follow edges, optionally filtered by `?search=`
pub async fn list_follows(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<FollowQuery>,
) -> Result<HttpResponse> {
    let service = FollowService::new(state.store.clone());
    let follows = service
        .list_follows(&user, query.search.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(follows))
}

pub async fn create_follow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<FollowPayload>,
) -> Result<HttpResponse> {
    let service = FollowService::new(state.store.clone());
    let follow = service.create_follow(&user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(follow))
}
