//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewUserRecord, User};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// The email unique constraint was violated.
    #[error("email already in use: {message}")]
    DuplicateEmail { message: String },
}

impl UserRepositoryError {
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

    /// Create a duplicate-email error with the given message.
    pub fn duplicate_email(message: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            message: message.into(),
        }
    }
}

/// Persistence contract for users.
///
/// All read operations see live rows only. Exactly one production
/// implementation exists (`DieselUserRepository`) plus an in-memory test
/// double.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the stored entity with its generated id
    /// and timestamps. Duplicate email surfaces as
    /// [`UserRepositoryError::DuplicateEmail`].
    async fn create(&self, new: NewUserRecord) -> Result<User, UserRepositoryError>;

    /// Fetch a live user by id. `None` when absent or soft-deleted.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError>;

    /// All live users, creation-time descending.
    async fn find_all(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Live users belonging to the organization, creation-time descending.
    async fn find_by_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<User>, UserRepositoryError>;

    /// Persist a merged entity. Returns the stored entity with its bumped
    /// `updated_at`, or `None` when no live row matched the id.
    async fn update(&self, user: &User) -> Result<Option<User>, UserRepositoryError>;

    /// Soft-delete by id. Returns the number of live rows affected.
    async fn soft_delete(&self, id: Uuid) -> Result<usize, UserRepositoryError>;

    /// Case-insensitive substring match on name or email, name ascending,
    /// optionally capped.
    async fn search(
        &self,
        query: &str,
        limit: Option<i64>,
    ) -> Result<Vec<User>, UserRepositoryError>;
}
