//! Environment-driven server configuration.
//!
//! `DATABASE_URL` wins when set; otherwise the URL is assembled from the
//! individual `DB_*` variables so deployments can supply either form.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Application configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub pool_max_size: u32,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn database_url_from_parts() -> String {
    let host = env_or("DB_HOST", "localhost");
    let port: u16 = env_parsed("DB_PORT", 5432);
    let user = env_or("DB_USER", "postgres");
    let password = env_or("DB_PASSWORD", "postgres");
    let name = env_or("DB_NAME", "custapi");
    let ssl_mode = env_or("DB_SSLMODE", "disable");
    format!("postgres://{user}:{password}@{host}:{port}/{name}?sslmode={ssl_mode}")
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        let port: u16 = env_parsed("PORT", DEFAULT_PORT);
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(database_url_from_parts);

        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
            database_url,
            pool_max_size: env_parsed("DB_POOL_MAX_SIZE", DEFAULT_POOL_MAX_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment-variable driven paths are covered indirectly; mutating
    // process-global env in parallel tests is racy, so only the pure
    // assembly helper is tested here.
    #[test]
    fn url_assembly_uses_postgres_scheme() {
        let url = database_url_from_parts();
        assert!(url.starts_with("postgres://"));
        assert!(url.contains("sslmode="));
    }

    #[test]
    fn defaults_are_sane() {
        assert_eq!(DEFAULT_PORT, 8080);
        assert_eq!(DEFAULT_POOL_MAX_SIZE, 10);
    }
}
