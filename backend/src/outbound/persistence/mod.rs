//! PostgreSQL persistence adapters.
//!
//! Implements the domain's repository ports on Diesel with async
//! connections. Row structs and the generated schema stay private to
//! this module; only the adapters and the pool are exported.

mod diesel_organization_repository;
mod diesel_user_repository;
mod models;
pub mod pool;
pub(crate) mod schema;

pub use diesel_organization_repository::DieselOrganizationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
