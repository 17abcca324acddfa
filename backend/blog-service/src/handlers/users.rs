/// User registration
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::{RegisterRequest, UserResponse};
use crate::services::UserService;
use crate::AppState;

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    let user = service.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}
