//! Helper functions for creating specific error types

use super::types::GatewayError;

impl GatewayError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error means the backing table has not been created yet.
    ///
    /// Store reads treat this as "no data" so the broker keeps serving before
    /// migrations have run.
    pub fn is_missing_table(&self) -> bool {
        match self {
            Self::Database(err) => {
                let text = err.to_string().to_lowercase();
                text.contains("no such table")
                    || (text.contains("relation") && text.contains("does not exist"))
            }
            _ => false,
        }
    }
}
