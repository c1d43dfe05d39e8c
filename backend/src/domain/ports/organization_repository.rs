//! Port abstraction for organization persistence adapters and their errors.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewOrganization, Organization, OrganizationCoordinate};

/// Persistence errors raised by organization repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrganizationRepositoryError {
    /// Repository connection could not be established.
    #[error("organization repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("organization repository query failed: {message}")]
    Query { message: String },
}

impl OrganizationRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence contract for organizations.
///
/// All read operations see live rows only; soft-deleted rows are invisible.
/// Exactly one production implementation exists
/// (`DieselOrganizationRepository`) plus an in-memory test double.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Insert a new organization and return the stored entity with its
    /// generated id and timestamps.
    async fn create(
        &self,
        new: NewOrganization,
    ) -> Result<Organization, OrganizationRepositoryError>;

    /// Fetch a live organization by id. `None` when absent or soft-deleted.
    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Organization>, OrganizationRepositoryError>;

    /// Fetch the live subset of the requested ids, creation-time
    /// descending. Missing ids are silently omitted.
    async fn find_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Organization>, OrganizationRepositoryError>;

    /// All live organizations, creation-time descending.
    async fn find_all(&self) -> Result<Vec<Organization>, OrganizationRepositoryError>;

    /// Id and coordinate for every live organization that has a coordinate.
    async fn find_all_coordinates(
        &self,
    ) -> Result<Vec<OrganizationCoordinate>, OrganizationRepositoryError>;

    /// Persist a merged entity. Returns the stored entity with its bumped
    /// `updated_at`, or `None` when no live row matched the id.
    async fn update(
        &self,
        organization: &Organization,
    ) -> Result<Option<Organization>, OrganizationRepositoryError>;

    /// Soft-delete by id. Returns the number of live rows affected so the
    /// caller can distinguish "already gone" from success.
    async fn soft_delete(&self, id: Uuid) -> Result<usize, OrganizationRepositoryError>;

    /// Case-insensitive substring match on name, name ascending, optionally
    /// capped.
    async fn search(
        &self,
        query: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Organization>, OrganizationRepositoryError>;
}
