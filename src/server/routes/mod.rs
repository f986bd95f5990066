//! HTTP route modules

pub mod admin;
pub mod broker;
pub mod health;

use actix_web::web;

/// Standard envelope for administrative and health endpoints
#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: serde::Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Register every route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(broker::configure_routes)
        .configure(admin::configure_routes);
}
