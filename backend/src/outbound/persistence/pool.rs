//! Async-safe connection pool for Diesel PostgreSQL connections.
//!
//! Wraps `diesel-async` and `bb8` so repositories check out connections per
//! operation and release them on every exit path, including cancellation
//! (dropping the future returns the connection to the pool).

use std::time::Duration;

use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Configuration for the database connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Create a new configuration with the given database URL.
    ///
    /// Defaults: 10 connections, 30 second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            connection_timeout: Duration::from_secs(30),
        }
    }

    /// Set the maximum number of connections in the pool.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the connection checkout timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Get the database URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Async connection pool for PostgreSQL via Diesel.
#[derive(Clone)]
pub struct DbPool {
    pool: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build a pool from the given configuration.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url());
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|e| PoolError::build(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Check out a connection. The connection returns to the pool on drop.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.pool
            .get()
            .await
            .map_err(|e| PoolError::checkout(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_are_applied() {
        let config = PoolConfig::new("postgres://localhost/custapi");
        assert_eq!(config.database_url(), "postgres://localhost/custapi");
        assert_eq!(config.max_size, 10);
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
    }

    #[test]
    fn config_builder_overrides() {
        let config = PoolConfig::new("postgres://localhost/custapi")
            .with_max_size(4)
            .with_connection_timeout(Duration::from_secs(5));
        assert_eq!(config.max_size, 4);
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
    }

    #[test]
    fn pool_errors_render_their_message() {
        assert_eq!(
            PoolError::checkout("timed out").to_string(),
            "failed to get connection from pool: timed out"
        );
    }
}
