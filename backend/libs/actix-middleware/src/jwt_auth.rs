use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    Error, HttpMessage, HttpResponse, ResponseError,
};
use futures::future::{ready, Ready};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Identity resolved from a valid Bearer access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

/// Authentication failures rendered as JSON with a `WWW-Authenticate` challenge
#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    InvalidToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredentials => {
                write!(f, "Authentication credentials were not provided.")
            }
            AuthError::InvalidToken => write!(f, "Given token not valid for any token type"),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized()
            .insert_header((header::WWW_AUTHENTICATE, "Bearer realm=\"api\""))
            .json(serde_json::json!({
                "error": self.to_string(),
                "status": StatusCode::UNAUTHORIZED.as_u16(),
            }))
    }
}

/// JWT Authentication Middleware
///
/// Authentication is optional: requests without a Bearer header pass through
/// anonymously and handlers decide whether they need an identity. A Bearer
/// header that does not carry a valid access token is rejected outright.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

/// Returns the token of a `Bearer` authorization header, `None` for any other scheme
fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim().to_string())
    } else {
        None
    }
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            if let Some(token) = bearer_token(&req) {
                let identity = crypto_core::jwt::validate_access_token(&token)
                    .and_then(|claims| Ok((claims.user_id()?, claims.username)));

                match identity {
                    Ok((id, username)) => {
                        req.extensions_mut()
                            .insert(AuthenticatedUser { id, username });
                    }
                    Err(e) => {
                        tracing::warn!(path = %req.path(), "JWT validation failed: {}", e);
                        let response = AuthError::InvalidToken.error_response();
                        return Ok(req.into_response(response).map_into_right_body());
                    }
                }
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// FromRequest implementation for AuthenticatedUser
///
/// Wrap in `Option` for endpoints that also serve anonymous callers.
impl actix_web::FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AuthError::MissingCredentials.into())),
        }
    }
}
