/// Health probes
use std::time::Instant;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    storage: ComponentCheck,
    timestamp: String,
}

/// Summary used by load balancers
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "storage": state.store.backend(),
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("{} storage unavailable: {}", state.store.backend(), e),
            "service": "blog-service"
        })),
    }
}

pub async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    let start = Instant::now();
    let result = state.store.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (ready, storage) = match result {
        Ok(()) => (
            true,
            ComponentCheck {
                status: ComponentStatus::Healthy,
                message: format!("{} storage reachable", state.store.backend()),
                latency_ms,
            },
        ),
        Err(e) => (
            false,
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("{} storage check failed: {}", state.store.backend(), e),
                latency_ms,
            },
        ),
    };

    let response = ReadinessResponse {
        ready,
        storage,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "alive" }))
}
