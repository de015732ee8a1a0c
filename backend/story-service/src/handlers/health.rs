/// Health endpoints used by container orchestration
use crate::services::StoriesService;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize, Clone)]
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
    status: ComponentStatus,
    storage: ComponentCheck,
    timestamp: String,
}

pub async fn health_summary(service: web::Data<StoriesService>) -> HttpResponse {
    match service.store().health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "story-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("Storage check failed: {}", e),
            "service": "story-service"
        })),
    }
}

pub async fn readiness_summary(service: web::Data<StoriesService>) -> HttpResponse {
    let start = Instant::now();
    let result = service.store().health_check().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (ready, storage) = match result {
        Ok(()) => (
            true,
            ComponentCheck {
                status: ComponentStatus::Healthy,
                message: "Story storage reachable".to_string(),
                latency_ms,
            },
        ),
        Err(e) => (
            false,
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("Story storage check failed: {}", e),
                latency_ms,
            },
        ),
    };

    let response = ReadinessResponse {
        ready,
        status: storage.status.clone(),
        storage,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
