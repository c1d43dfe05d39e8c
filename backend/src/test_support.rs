//! In-memory repository doubles for tests.
//!
//! One double per persistence port, mirroring the production adapters'
//! soft-delete and ordering semantics closely enough to exercise the
//! service layer without a live store. Exposed to integration tests via
//! the `test-support` feature.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::ports::{
    OrganizationRepository, OrganizationRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    NewOrganization, NewUserRecord, Organization, OrganizationCoordinate, User,
};

fn matches_query(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn apply_limit<T>(mut rows: Vec<T>, limit: Option<i64>) -> Vec<T> {
    if let Some(limit) = limit {
        rows.truncate(usize::try_from(limit).unwrap_or(0));
    }
    rows
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

struct StoredOrganization {
    organization: Organization,
    deleted: bool,
    seq: u64,
}

#[derive(Default)]
struct OrganizationState {
    rows: Vec<StoredOrganization>,
    failure: Option<OrganizationRepositoryError>,
    seq: u64,
}

/// In-memory `OrganizationRepository` double.
#[derive(Default)]
pub struct InMemoryOrganizationRepository {
    state: Mutex<OrganizationState>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with the given error.
    pub fn set_failure(&self, failure: OrganizationRepositoryError) {
        self.state.lock().expect("state lock").failure = Some(failure);
    }

    /// Number of live rows, for asserting that an operation wrote nothing.
    pub fn live_count(&self) -> usize {
        self.state
            .lock()
            .expect("state lock")
            .rows
            .iter()
            .filter(|row| !row.deleted)
            .count()
    }

    fn check_failure(
        state: &OrganizationState,
    ) -> Result<(), OrganizationRepositoryError> {
        match &state.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn live_sorted_desc(state: &OrganizationState) -> Vec<Organization> {
        let mut rows: Vec<_> = state.rows.iter().filter(|row| !row.deleted).collect();
        rows.sort_by(|a, b| b.seq.cmp(&a.seq));
        rows.iter().map(|row| row.organization.clone()).collect()
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn create(
        &self,
        new: NewOrganization,
    ) -> Result<Organization, OrganizationRepositoryError> {
        let mut state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;

        let now = Utc::now();
        let organization = Organization {
            id: Uuid::new_v4(),
            name: new.name,
            coordinate: new.coordinate,
            address: new.address,
            description: new.description,
            image_urls: new.image_urls,
            created_at: now,
            updated_at: now,
        };
        state.seq += 1;
        let seq = state.seq;
        state.rows.push(StoredOrganization {
            organization: organization.clone(),
            deleted: false,
            seq,
        });
        Ok(organization)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Organization>, OrganizationRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        Ok(state
            .rows
            .iter()
            .find(|row| !row.deleted && row.organization.id == id)
            .map(|row| row.organization.clone()))
    }

    async fn find_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Organization>, OrganizationRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        Ok(Self::live_sorted_desc(&state)
            .into_iter()
            .filter(|organization| ids.contains(&organization.id))
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Organization>, OrganizationRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        Ok(Self::live_sorted_desc(&state))
    }

    async fn find_all_coordinates(
        &self,
    ) -> Result<Vec<OrganizationCoordinate>, OrganizationRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        Ok(Self::live_sorted_desc(&state)
            .into_iter()
            .filter_map(|organization| {
                organization.coordinate.map(|coordinate| OrganizationCoordinate {
                    id: organization.id,
                    coordinate,
                })
            })
            .collect())
    }

    async fn update(
        &self,
        organization: &Organization,
    ) -> Result<Option<Organization>, OrganizationRepositoryError> {
        let mut state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        let Some(row) = state
            .rows
            .iter_mut()
            .find(|row| !row.deleted && row.organization.id == organization.id)
        else {
            return Ok(None);
        };
        let mut updated = organization.clone();
        updated.created_at = row.organization.created_at;
        updated.updated_at = Utc::now();
        row.organization = updated.clone();
        Ok(Some(updated))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<usize, OrganizationRepositoryError> {
        let mut state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        let Some(row) = state
            .rows
            .iter_mut()
            .find(|row| !row.deleted && row.organization.id == id)
        else {
            return Ok(0);
        };
        row.deleted = true;
        Ok(1)
    }

    async fn search(
        &self,
        query: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Organization>, OrganizationRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        let mut rows: Vec<_> = Self::live_sorted_desc(&state)
            .into_iter()
            .filter(|organization| matches_query(&organization.name, query))
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(apply_limit(rows, limit))
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

struct StoredUser {
    user: User,
    deleted: bool,
    seq: u64,
}

#[derive(Default)]
struct UserState {
    rows: Vec<StoredUser>,
    failure: Option<UserRepositoryError>,
    seq: u64,
}

/// In-memory `UserRepository` double.
#[derive(Default)]
pub struct InMemoryUserRepository {
    state: Mutex<UserState>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with the given error.
    pub fn set_failure(&self, failure: UserRepositoryError) {
        self.state.lock().expect("state lock").failure = Some(failure);
    }

    /// Number of live rows, for asserting that an operation wrote nothing.
    pub fn live_count(&self) -> usize {
        self.state
            .lock()
            .expect("state lock")
            .rows
            .iter()
            .filter(|row| !row.deleted)
            .count()
    }

    fn check_failure(state: &UserState) -> Result<(), UserRepositoryError> {
        match &state.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn live_sorted_desc(state: &UserState) -> Vec<User> {
        let mut rows: Vec<_> = state.rows.iter().filter(|row| !row.deleted).collect();
        rows.sort_by(|a, b| b.seq.cmp(&a.seq));
        rows.iter().map(|row| row.user.clone()).collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new: NewUserRecord) -> Result<User, UserRepositoryError> {
        let mut state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;

        if state
            .rows
            .iter()
            .any(|row| !row.deleted && row.user.email == new.email)
        {
            return Err(UserRepositoryError::duplicate_email(format!(
                "email {} already in use",
                new.email
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            name: new.name,
            organization_id: new.organization_id,
            is_admin: new.is_admin,
            phone_number: new.phone_number,
            social_media: new.social_media,
            description: new.description,
            avatar_url: new.avatar_url,
            research_categories: new.research_categories,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.seq += 1;
        let seq = state.seq;
        state.rows.push(StoredUser {
            user: user.clone(),
            deleted: false,
            seq,
        });
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        Ok(state
            .rows
            .iter()
            .find(|row| !row.deleted && row.user.id == id)
            .map(|row| row.user.clone()))
    }

    async fn find_all(&self) -> Result<Vec<User>, UserRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        Ok(Self::live_sorted_desc(&state))
    }

    async fn find_by_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<User>, UserRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        Ok(Self::live_sorted_desc(&state)
            .into_iter()
            .filter(|user| user.organization_id == organization_id)
            .collect())
    }

    async fn update(&self, user: &User) -> Result<Option<User>, UserRepositoryError> {
        let mut state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        let duplicate = state.rows.iter().any(|row| {
            !row.deleted && row.user.email == user.email && row.user.id != user.id
        });
        if duplicate {
            return Err(UserRepositoryError::duplicate_email(format!(
                "email {} already in use",
                user.email
            )));
        }
        let Some(row) = state
            .rows
            .iter_mut()
            .find(|row| !row.deleted && row.user.id == user.id)
        else {
            return Ok(None);
        };
        let mut updated = user.clone();
        updated.created_at = row.user.created_at;
        updated.updated_at = Utc::now();
        row.user = updated.clone();
        Ok(Some(updated))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<usize, UserRepositoryError> {
        let mut state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        let Some(row) = state
            .rows
            .iter_mut()
            .find(|row| !row.deleted && row.user.id == id)
        else {
            return Ok(0);
        };
        row.deleted = true;
        Ok(1)
    }

    async fn search(
        &self,
        query: &str,
        limit: Option<i64>,
    ) -> Result<Vec<User>, UserRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Self::check_failure(&state)?;
        let mut rows: Vec<_> = Self::live_sorted_desc(&state)
            .into_iter()
            .filter(|user| matches_query(&user.name, query) || matches_query(&user.email, query))
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(apply_limit(rows, limit))
    }
}
