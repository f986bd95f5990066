//! HTTP server implementation
//!
//! A thin actix-web surface over the request broker, routing rule
//! administration and provider health.

pub mod builder;
pub mod routes;
pub mod server;
pub mod state;


pub use builder::ServerBuilder;
pub use server::HttpServer;
pub use state::AppState;
