use crate::app_state::AppState;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
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
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "blog-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn readiness_check(state: web::Data<AppState>) -> HttpResponse {
    let mut checks = HashMap::new();
    let mut ready = true;

    let start = Instant::now();
    let store_check = match state.store.health_check().await {
        Ok(()) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "Store reachable".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => {
            ready = false;
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("Store check failed: {:#}", e),
                latency_ms: start.elapsed().as_millis() as u64,
            }
        }
    };
    checks.insert("store".to_string(), store_check);

    let start = Instant::now();
    let cache_check = match state.page_cache.ping().await {
        Ok(()) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "Page cache reachable".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => {
            ready = false;
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("Page cache ping failed: {}", e),
                latency_ms: start.elapsed().as_millis() as u64,
            }
        }
    };
    checks.insert("page_cache".to_string(), cache_check);

    let response = ReadinessResponse {
        ready,
        status: if ready {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Unhealthy
        },
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
