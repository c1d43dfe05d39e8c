//! Backend entry-point: wires configuration, the connection pool, the
//! domain services, and the HTTP server.

use std::sync::Arc;

use actix_web::{web, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use custapi::domain::{OrganizationService, UserService};
use custapi::inbound::http::health::HealthState;
use custapi::inbound::http::state::HttpState;
use custapi::outbound::persistence::{
    DbPool, DieselOrganizationRepository, DieselUserRepository, PoolConfig,
};
use custapi::server::{build_app, AppConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env();

    let pool = DbPool::new(
        PoolConfig::new(config.database_url.clone()).with_max_size(config.pool_max_size),
    )
    .await
    .map_err(std::io::Error::other)?;

    let organization_repository = Arc::new(DieselOrganizationRepository::new(pool.clone()));
    let user_repository = Arc::new(DieselUserRepository::new(pool));
    let organizations = OrganizationService::new(organization_repository.clone());
    let users = UserService::new(user_repository, organization_repository);

    let state = web::Data::new(HttpState::new(organizations, users));
    let health_state = web::Data::new(HealthState::new());
    let server_state = state.clone();
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_state.clone(), server_health_state.clone())
    })
    .bind(config.bind_addr)?;

    info!(addr = %config.bind_addr, "server listening");
    health_state.mark_ready();
    server.run().await
}
