/// Maintenance endpoints, mounted only when `ADMIN_ENDPOINTS_ENABLED` is set
use crate::app_state::AppState;
use crate::error::Result;
use actix_web::{web, HttpResponse};
use tracing::info;

/// Drop every cached page so the next index request renders fresh content
pub async fn clear_page_cache(state: web::Data<AppState>) -> Result<HttpResponse> {
    let cleared = state.page_cache.clear().await?;
    info!(cleared, "page cache cleared");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "cleared": cleared })))
}
