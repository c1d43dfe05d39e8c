//! PostgreSQL-backed `UserRepository` implementation using Diesel.
//!
//! Mirrors the organization adapter, with one extra mapping: a unique
//! violation on the email index becomes the port's duplicate-email error
//! so the service can report a conflict instead of a server fault.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{NewUserRecord, User};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserRepositoryError::duplicate_email(info.message())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserRepositoryError::connection("database connection error")
        }
        DieselError::NotFound => UserRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserRepositoryError::query("database query error"),
        DieselError::DatabaseError(_, _) => UserRepositoryError::query("database error"),
        _ => UserRepositoryError::query("database error"),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, new: NewUserRecord) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewUserRow {
            email: &new.email,
            name: &new.name,
            organization_id: new.organization_id,
            is_admin: new.is_admin,
            phone_number: new.phone_number.as_deref(),
            social_media: new.social_media.as_deref(),
            description: new.description.as_deref(),
            avatar_url: new.avatar_url.as_deref(),
            research_categories: &new.research_categories,
            password_hash: &new.password_hash,
        };

        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(stored.into_domain())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id))
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(UserRow::into_domain))
    }

    async fn find_all(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .order_by(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(UserRow::into_domain).collect())
    }

    async fn find_by_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::organization_id.eq(organization_id))
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .order_by(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(UserRow::into_domain).collect())
    }

    async fn update(&self, user: &User) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = UserChangeset::from_entity(user);
        let row: Option<UserRow> = diesel::update(
            users::table
                .filter(users::id.eq(user.id))
                .filter(users::deleted_at.is_null()),
        )
        .set(&changeset)
        .returning(UserRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        Ok(row.map(UserRow::into_domain))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<usize, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(
            users::table
                .filter(users::id.eq(id))
                .filter(users::deleted_at.is_null()),
        )
        .set(users::deleted_at.eq(Some(Utc::now())))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn search(
        &self,
        query: &str,
        limit: Option<i64>,
    ) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let pattern = format!("%{query}%");
        let mut statement = users::table
            .filter(users::deleted_at.is_null())
            .filter(
                users::name
                    .ilike(pattern.clone())
                    .or(users::email.ilike(pattern)),
            )
            .select(UserRow::as_select())
            .order_by(users::name.asc())
            .into_boxed();

        if let Some(limit) = limit {
            statement = statement.limit(limit);
        }

        let rows: Vec<UserRow> = statement.load(&mut conn).await.map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(UserRow::into_domain).collect())
    }
}
