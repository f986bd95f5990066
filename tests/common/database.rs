//! Test database utilities
//!
//! Each test gets an isolated in-memory SQLite database.

use ai_request_broker::config::DatabaseConfig;
use ai_request_broker::storage::database::Database;
use std::sync::Arc;

/// Isolated in-memory SQLite instance
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<Database>,
}

impl TestDatabase {
    /// Create a migrated in-memory database
    pub async fn new() -> Self {
        let db = Self::unmigrated().await;
        db.inner
            .migrate()
            .await
            .expect("Failed to run database migrations");
        db
    }

    /// Create an in-memory database without any tables
    pub async fn unmigrated() -> Self {
        let db = Database::new(&test_db_config())
            .await
            .expect("Failed to create in-memory test database");
        Self {
            inner: Arc::new(db),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner
    }

    pub fn db_arc(&self) -> Arc<Database> {
        Arc::clone(&self.inner)
    }
}

/// In-memory SQLite only supports a single connection
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
        enabled: true,
    }
}
