//! Driven ports: persistence contracts the domain services depend on.
//!
//! Each port has exactly one production implementation (Diesel-backed,
//! under `outbound::persistence`) and one in-memory test double (under
//! `test_support`), keeping the service layer testable without a live
//! store.

mod organization_repository;
mod user_repository;

pub use organization_repository::{OrganizationRepository, OrganizationRepositoryError};
pub use user_repository::{UserRepository, UserRepositoryError};
