//! Administrative endpoints: routing rules and the response cache

use crate::core::types::RoutingRuleSpec;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::info;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/admin")
            .route("/routing-rules", web::get().to(list_rules))
            .route("/routing-rules", web::post().to(upsert_rule))
            .route("/routing-rules/{id}", web::delete().to(delete_rule))
            .route("/cache/stats", web::get().to(cache_stats))
            .route("/cache", web::delete().to(clear_cache)),
    );
}

async fn list_rules(state: web::Data<AppState>) -> Result<HttpResponse, GatewayError> {
    let rules = state.rules.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(rules)))
}

async fn upsert_rule(
    state: web::Data<AppState>,
    spec: web::Json<RoutingRuleSpec>,
) -> Result<HttpResponse, GatewayError> {
    let rule = state.rules.upsert(spec.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(rule)))
}

async fn delete_rule(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let id = path.into_inner();
    state.rules.delete(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({ "deleted": id }))))
}

async fn cache_stats(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(state.broker.cache().stats()))
}

async fn clear_cache(state: web::Data<AppState>) -> HttpResponse {
    let removed = state.broker.cache().clear().await;
    info!(removed, "Response cache cleared");
    HttpResponse::Ok().json(ApiResponse::success(json!({ "removed": removed })))
}
