/// JWT token endpoints: obtain a pair, refresh an access token, verify a token
use actix_web::{web, HttpResponse};
use crypto_core::jwt;

use crate::error::Result;
use crate::models::{TokenObtainRequest, TokenRefreshRequest, TokenVerifyRequest};
use crate::services::UserService;
use crate::validation;
use crate::AppState;

/// Exchange credentials for `{refresh, access}`
pub async fn create_token(
    state: web::Data<AppState>,
    body: web::Json<TokenObtainRequest>,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    let user = service.authenticate(body.into_inner()).await?;

    let pair = jwt::generate_token_pair(user.id, &user.username)?;
    tracing::info!(user_id = user.id, "Token pair issued");
    Ok(HttpResponse::Ok().json(pair))
}

/// Exchange a refresh token for a new access token
pub async fn refresh_token(body: web::Json<TokenRefreshRequest>) -> Result<HttpResponse> {
    let body = body.into_inner();
    validation::collect(&body).into_result()?;
    let token = body.refresh.unwrap_or_default();

    let claims = jwt::validate_refresh_token(&token)?;
    let access = jwt::generate_access_token(claims.user_id()?, &claims.username)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "access": access })))
}

/// 200 with an empty object when the token (of either type) is valid
pub async fn verify_token(body: web::Json<TokenVerifyRequest>) -> Result<HttpResponse> {
    let body = body.into_inner();
    validation::collect(&body).into_result()?;
    let token = body.token.unwrap_or_default();

    jwt::validate_token(&token)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({})))
}
