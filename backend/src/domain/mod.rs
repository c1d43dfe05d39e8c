//! Domain entities, services, and ports.
//!
//! Types here are transport and storage agnostic. Inbound adapters decode
//! requests into the `New*`/`*Update` types; outbound adapters implement
//! the repository ports in `ports`.

pub mod error;
pub mod organization;
mod organization_service;
pub mod password;
pub mod ports;
pub mod user;
mod user_service;

pub use self::error::{Error, ErrorCode};
pub use self::organization::{
    Coordinate, CoordinateError, NewOrganization, Organization, OrganizationCoordinate,
    OrganizationUpdate,
};
pub use self::organization_service::OrganizationService;
pub use self::user::{NewUser, NewUserRecord, User, UserUpdate};
pub use self::user_service::UserService;
