//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod organizations;
pub mod state;
pub mod users;
pub(crate) mod validation;

pub use error::ApiResult;
