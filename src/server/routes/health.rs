//! Health check endpoints

use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/health")
            .route("", web::get().to(health_check))
            .route("/providers", web::get().to(provider_health)),
    );
}

#[derive(Debug, Serialize)]
struct ServiceHealth {
    status: Cow<'static, str>,
    timestamp: chrono::DateTime<chrono::Utc>,
    version: Cow<'static, str>,
    providers: usize,
    monitor_running: bool,
}

/// Liveness of the service itself
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    debug!("Health check requested");
    HttpResponse::Ok().json(ApiResponse::success(ServiceHealth {
        status: Cow::Borrowed("healthy"),
        timestamp: chrono::Utc::now(),
        version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
        providers: state.broker.registry().len(),
        monitor_running: state.health.is_running(),
    }))
}

/// Latest health record per provider
pub async fn provider_health(state: web::Data<AppState>) -> Result<HttpResponse, GatewayError> {
    let mut records = state.store.latest_health_records().await?;
    records.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));
    Ok(HttpResponse::Ok().json(ApiResponse::success(records)))
}
