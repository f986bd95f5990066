//! HTTP server core implementation

use crate::config::{Config, ServerConfig};
use crate::server::builder::ServerBuilder;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_cors::Cors;
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use tracing::info;

/// HTTP server
#[derive(Debug)]
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server, opening storage and building adapters from `config`
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");
        ServerBuilder::new().with_config(config.clone()).build().await
    }

    pub fn from_state(state: AppState) -> Self {
        Self {
            config: state.config.server.clone(),
            state,
        }
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let cors_config = &state.config.server.cors;
        let mut cors = Cors::default();
        if cors_config.enabled {
            if cors_config.allows_all_origins() {
                cors = cors.allow_any_origin();
            } else {
                for origin in &cors_config.allowed_origins {
                    cors = cors.allowed_origin(origin);
                }
            }
            cors = cors
                .allow_any_method()
                .allow_any_header()
                .max_age(cors_config.max_age as usize);
        }

        App::new()
            .app_data(state)
            .app_data(web::JsonConfig::default().limit(1024 * 1024))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("Server", "ai-request-broker")))
            .configure(routes::configure_routes)
    }

    /// Start the health monitor and serve until shutdown
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        info!("Starting HTTP server on {}", bind_addr);

        self.state.health.start();
        let health = self.state.health.clone();
        let workers = self.config.worker_count();
        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .workers(workers)
            .bind(&bind_addr)
            .map_err(|e| {
                GatewayError::Config(format!("Failed to bind to {}: {}", bind_addr, e))
            })?
            .run();

        info!("HTTP server listening on {}", bind_addr);
        let result = server
            .await
            .map_err(|e| GatewayError::internal(format!("Server error: {}", e)));

        health.shutdown().await;
        info!("HTTP server stopped");
        result
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
