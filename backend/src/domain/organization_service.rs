//! Organization business layer.
//!
//! There is deliberately little business logic here: shape validation is
//! the inbound adapter's job, so this service delegates to the repository
//! and owns only the partial-update merge and the zero-rows-deleted
//! mapping.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::ports::{OrganizationRepository, OrganizationRepositoryError};
use crate::domain::{
    Error, NewOrganization, Organization, OrganizationCoordinate, OrganizationUpdate,
};

/// Service exposing organization use cases to inbound adapters.
#[derive(Clone)]
pub struct OrganizationService {
    repository: Arc<dyn OrganizationRepository>,
}

fn map_repository_error(error: OrganizationRepositoryError) -> Error {
    match error {
        OrganizationRepositoryError::Connection { message } => Error::service_unavailable(message),
        OrganizationRepositoryError::Query { message } => Error::internal(message),
    }
}

impl OrganizationService {
    /// Create a service backed by the given repository.
    pub fn new(repository: Arc<dyn OrganizationRepository>) -> Self {
        Self { repository }
    }

    /// Persist a new organization and return the stored entity.
    pub async fn create(&self, new: NewOrganization) -> Result<Organization, Error> {
        self.repository
            .create(new)
            .await
            .map_err(map_repository_error)
    }

    /// Fetch a live organization. `None` is absence, not an error.
    pub async fn get(&self, id: Uuid) -> Result<Option<Organization>, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_repository_error)
    }

    /// All live organizations, most recently created first.
    pub async fn list(&self) -> Result<Vec<Organization>, Error> {
        self.repository
            .find_all()
            .await
            .map_err(map_repository_error)
    }

    /// Batch lookup. Missing ids are silently omitted; the result keeps
    /// creation-time-descending order.
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Organization>, Error> {
        self.repository
            .find_by_ids(ids)
            .await
            .map_err(map_repository_error)
    }

    /// Id and coordinate pairs for every live organization with a
    /// coordinate set.
    pub async fn coordinates(&self) -> Result<Vec<OrganizationCoordinate>, Error> {
        self.repository
            .find_all_coordinates()
            .await
            .map_err(map_repository_error)
    }

    /// Merge the supplied fields onto the stored entity and persist.
    ///
    /// The read-merge-write sequence is not atomic end-to-end; concurrent
    /// updates to the same id can lose writes. This matches the store's
    /// row-level atomicity guarantee and nothing stronger.
    pub async fn update(&self, id: Uuid, update: OrganizationUpdate) -> Result<Organization, Error> {
        let Some(mut organization) = self
            .repository
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
        else {
            return Err(Error::not_found("organization not found"));
        };

        organization.apply(update);

        self.repository
            .update(&organization)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("organization not found"))
    }

    /// Soft-delete. Zero affected rows means the id was absent or already
    /// deleted, which surfaces as not-found.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let affected = self
            .repository
            .soft_delete(id)
            .await
            .map_err(map_repository_error)?;
        if affected == 0 {
            return Err(Error::not_found("organization not found"));
        }
        Ok(())
    }

    /// Case-insensitive substring search on name, alphabetical. A limit of
    /// zero or less means unbounded.
    pub async fn search(&self, query: &str, limit: Option<i64>) -> Result<Vec<Organization>, Error> {
        let limit = limit.filter(|l| *l > 0);
        self.repository
            .search(query, limit)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
mod tests;
