//! Prometheus metrics for blog-service.
//!
//! HTTP request counters come from `actix-middleware`; the collectors here
//! count content writes and permission denials.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Successful writes by resource (post, comment, follow, user) and action.
    pub static ref CONTENT_WRITES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_content_writes_total",
        "Successful content writes segmented by resource and action",
        &["resource", "action"]
    )
    .expect("failed to register blog_content_writes_total");

    /// Write attempts rejected by the author-or-read-only check.
    pub static ref PERMISSION_DENIALS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_permission_denials_total",
        "Writes rejected because the caller is not the author",
        &["resource", "reason"]
    )
    .expect("failed to register blog_permission_denials_total");
}

pub fn record_write(resource: &str, action: &str) {
    CONTENT_WRITES_TOTAL
        .with_label_values(&[resource, action])
        .inc();
}

pub fn record_denial(resource: &str, reason: &str) {
    PERMISSION_DENIALS_TOTAL
        .with_label_values(&[resource, reason])
        .inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    match actix_middleware::gather_metrics() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}
