/// URL layout
///
/// Health and metrics sit at the root; the API lives under `/v1/` behind the
/// optional JWT authentication middleware. Numeric ids match `[1-9]\d*`.
use actix_middleware::JwtAuthMiddleware;
use actix_web::{error, web, HttpRequest};

use crate::error::AppError;
use crate::handlers::{
    self, comments, follows, groups, health, jwt, posts, users,
};
use crate::metrics::serve_metrics;

/// Malformed or mistyped JSON bodies are a plain 400
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        AppError::BadRequest(format!("JSON parse error - {err}")).into()
    })
}

fn resource(path: &str) -> actix_web::Resource {
    web::resource(path).default_service(web::to(handlers::method_not_allowed))
}

/// Routes under `/v1`
fn api(cfg: &mut web::ServiceConfig) {
    cfg.service(resource("/").route(web::get().to(handlers::api_root)))
        .service(
            resource("/posts/")
                .route(web::get().to(posts::list_posts))
                .route(web::post().to(posts::create_post)),
        )
        .service(
            resource(r"/posts/{id:[1-9]\d*}/")
                .route(web::get().to(posts::get_post))
                .route(web::put().to(posts::update_post))
                .route(web::patch().to(posts::partial_update_post))
                .route(web::delete().to(posts::delete_post)),
        )
        .service(
            resource(r"/posts/{post_id:[1-9]\d*}/comments/")
                .route(web::get().to(comments::list_comments))
                .route(web::post().to(comments::create_comment)),
        )
        .service(
            resource(r"/posts/{post_id:[1-9]\d*}/comments/{id:[1-9]\d*}/")
                .route(web::get().to(comments::get_comment))
                .route(web::put().to(comments::update_comment))
                .route(web::patch().to(comments::partial_update_comment))
                .route(web::delete().to(comments::delete_comment)),
        )
        .service(resource("/groups/").route(web::get().to(groups::list_groups)))
        .service(resource(r"/groups/{id:[1-9]\d*}/").route(web::get().to(groups::get_group)))
        .service(
            resource("/follow/")
                .route(web::get().to(follows::list_follows))
                .route(web::post().to(follows::create_follow)),
        )
        .service(resource("/jwt/create/").route(web::post().to(jwt::create_token)))
        .service(resource("/jwt/refresh/").route(web::post().to(jwt::refresh_token)))
        .service(resource("/jwt/verify/").route(web::post().to(jwt::verify_token)))
        .service(resource("/users/").route(web::post().to(users::register)));
}

/// Register every route; shared by the server and the HTTP tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/health/ready", web::get().to(health::readiness))
        .route("/health/live", web::get().to(health::liveness))
        .route("/metrics", web::get().to(serve_metrics))
        .service(
            web::scope("/v1")
                .wrap(JwtAuthMiddleware)
                .app_data(json_config())
                .configure(api)
                .default_service(web::to(handlers::not_found)),
        );
}
