//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use crate::domain::{OrganizationService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub organizations: OrganizationService,
    pub users: UserService,
}

impl HttpState {
    /// Bundle the domain services for injection into the Actix app.
    pub fn new(organizations: OrganizationService, users: UserService) -> Self {
        Self {
            organizations,
            users,
        }
    }
}
