//! Customer API backend library.
//!
//! Hexagonal layout: `domain` holds the entities, services and ports;
//! `outbound` implements the ports against PostgreSQL; `inbound` exposes
//! the HTTP surface; `server` assembles the application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
