//! User business layer.
//!
//! The one true invariant-enforcing step in this system lives here: a user
//! may only be created against an organization that exists and is live,
//! verified before any user row is written.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::ports::{
    OrganizationRepository, OrganizationRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{password, Error, NewUser, NewUserRecord, User, UserUpdate};

/// Service exposing user use cases to inbound adapters.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => Error::service_unavailable(message),
        UserRepositoryError::Query { message } => Error::internal(message),
        UserRepositoryError::DuplicateEmail { message } => Error::conflict(message),
    }
}

fn map_organization_repository_error(error: OrganizationRepositoryError) -> Error {
    match error {
        OrganizationRepositoryError::Connection { message } => Error::service_unavailable(message),
        OrganizationRepositoryError::Query { message } => Error::internal(message),
    }
}

impl UserService {
    /// Create a service backed by the given repositories.
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            users,
            organizations,
        }
    }

    /// Verify that the organization exists and is live.
    async fn require_organization(&self, organization_id: Uuid) -> Result<(), Error> {
        let organization = self
            .organizations
            .find_by_id(organization_id)
            .await
            .map_err(map_organization_repository_error)?;
        if organization.is_none() {
            return Err(Error::organization_not_found());
        }
        Ok(())
    }

    /// Create a user.
    ///
    /// The organization reference is resolved first; no user row is
    /// written when it does not resolve. The password is hashed before the
    /// insert record is built, so plaintext never reaches the repository.
    pub async fn create(&self, new: NewUser) -> Result<User, Error> {
        self.require_organization(new.organization_id).await?;

        let password_hash = password::hash_password(&new.password)?;
        let record = NewUserRecord::from_new_user(new, password_hash);

        self.users
            .create(record)
            .await
            .map_err(map_user_repository_error)
    }

    /// Fetch a live user. `None` is absence, not an error.
    pub async fn get(&self, id: Uuid) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)
    }

    /// All live users, most recently created first.
    pub async fn list(&self) -> Result<Vec<User>, Error> {
        self.users
            .find_all()
            .await
            .map_err(map_user_repository_error)
    }

    /// Users belonging to the organization, most recently created first.
    ///
    /// Fails with `OrganizationNotFound` when the organization is absent or
    /// soft-deleted — which includes parents tombstoned after their users
    /// were created, since deletion does not cascade.
    pub async fn list_by_organization(&self, organization_id: Uuid) -> Result<Vec<User>, Error> {
        self.require_organization(organization_id).await?;

        self.users
            .find_by_organization(organization_id)
            .await
            .map_err(map_user_repository_error)
    }

    /// Merge the supplied fields onto the stored entity and persist.
    ///
    /// A supplied password is re-hashed. A changed `organization_id` is NOT
    /// re-validated against the organization store; this mirrors the
    /// original behavior and is asserted by tests as a known gap.
    pub async fn update(&self, id: Uuid, update: UserUpdate) -> Result<User, Error> {
        let Some(mut user) = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
        else {
            return Err(Error::not_found("user not found"));
        };

        if let Some(plaintext) = update.password.as_deref() {
            user.password_hash = password::hash_password(plaintext)?;
        }
        user.apply(update);

        self.users
            .update(&user)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Soft-delete. Zero affected rows surfaces as not-found.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let affected = self
            .users
            .soft_delete(id)
            .await
            .map_err(map_user_repository_error)?;
        if affected == 0 {
            return Err(Error::not_found("user not found"));
        }
        Ok(())
    }

    /// Case-insensitive substring search on name or email, alphabetical by
    /// name. A limit of zero or less means unbounded.
    pub async fn search(&self, query: &str, limit: Option<i64>) -> Result<Vec<User>, Error> {
        let limit = limit.filter(|l| *l > 0);
        self.users
            .search(query, limit)
            .await
            .map_err(map_user_repository_error)
    }
}
