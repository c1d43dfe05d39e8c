//! PostgreSQL-backed `OrganizationRepository` implementation using Diesel.
//!
//! A thin adapter: translates between Diesel rows and domain entities,
//! keeps soft-deleted rows out of every read, and maps database failures
//! to the port's error type. No business logic lives here.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{OrganizationRepository, OrganizationRepositoryError};
use crate::domain::{NewOrganization, Organization, OrganizationCoordinate};

use super::models::{NewOrganizationRow, OrganizationChangeset, OrganizationRow};
use super::pool::{DbPool, PoolError};
use super::schema::organizations;

/// Diesel-backed implementation of the `OrganizationRepository` port.
#[derive(Clone)]
pub struct DieselOrganizationRepository {
    pool: DbPool,
}

impl DieselOrganizationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrganizationRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            OrganizationRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> OrganizationRepositoryError {
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
        DieselError::NotFound => OrganizationRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => {
            OrganizationRepositoryError::query("database query error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            OrganizationRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => OrganizationRepositoryError::query("database error"),
        _ => OrganizationRepositoryError::query("database error"),
    }
}

fn row_to_domain(row: OrganizationRow) -> Result<Organization, OrganizationRepositoryError> {
    row.into_domain().map_err(OrganizationRepositoryError::query)
}

fn rows_to_domain(
    rows: Vec<OrganizationRow>,
) -> Result<Vec<Organization>, OrganizationRepositoryError> {
    rows.into_iter().map(row_to_domain).collect()
}

#[async_trait]
impl OrganizationRepository for DieselOrganizationRepository {
    async fn create(
        &self,
        new: NewOrganization,
    ) -> Result<Organization, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewOrganizationRow {
            name: &new.name,
            latitude: new.coordinate.map(|c| c.latitude()),
            longitude: new.coordinate.map(|c| c.longitude()),
            address: new.address.as_deref(),
            description: new.description.as_deref(),
            image_urls: &new.image_urls,
        };

        let stored: OrganizationRow = diesel::insert_into(organizations::table)
            .values(&row)
            .returning(OrganizationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_domain(stored)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Organization>, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<OrganizationRow> = organizations::table
            .filter(organizations::id.eq(id))
            .filter(organizations::deleted_at.is_null())
            .select(OrganizationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_domain).transpose()
    }

    async fn find_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Organization>, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrganizationRow> = organizations::table
            .filter(organizations::id.eq_any(ids))
            .filter(organizations::deleted_at.is_null())
            .select(OrganizationRow::as_select())
            .order_by(organizations::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_domain(rows)
    }

    async fn find_all(&self) -> Result<Vec<Organization>, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrganizationRow> = organizations::table
            .filter(organizations::deleted_at.is_null())
            .select(OrganizationRow::as_select())
            .order_by(organizations::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_domain(rows)
    }

    async fn find_all_coordinates(
        &self,
    ) -> Result<Vec<OrganizationCoordinate>, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(Uuid, f64, f64)> = organizations::table
            .filter(organizations::deleted_at.is_null())
            .filter(organizations::latitude.is_not_null())
            .filter(organizations::longitude.is_not_null())
            .select((
                organizations::id,
                organizations::latitude.assume_not_null(),
                organizations::longitude.assume_not_null(),
            ))
            .order_by(organizations::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(id, latitude, longitude)| {
                crate::domain::Coordinate::new(latitude, longitude)
                    .map(|coordinate| OrganizationCoordinate { id, coordinate })
                    .map_err(|e| {
                        OrganizationRepositoryError::query(format!(
                            "stored coordinate out of range: {e}"
                        ))
                    })
            })
            .collect()
    }

    async fn update(
        &self,
        organization: &Organization,
    ) -> Result<Option<Organization>, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = OrganizationChangeset::from_entity(organization);
        let row: Option<OrganizationRow> = diesel::update(
            organizations::table
                .filter(organizations::id.eq(organization.id))
                .filter(organizations::deleted_at.is_null()),
        )
        .set(&changeset)
        .returning(OrganizationRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_domain).transpose()
    }

    async fn soft_delete(&self, id: Uuid) -> Result<usize, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(
            organizations::table
                .filter(organizations::id.eq(id))
                .filter(organizations::deleted_at.is_null()),
        )
        .set(organizations::deleted_at.eq(Some(Utc::now())))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn search(
        &self,
        query: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Organization>, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let pattern = format!("%{query}%");
        let mut statement = organizations::table
            .filter(organizations::deleted_at.is_null())
            .filter(organizations::name.ilike(pattern))
            .select(OrganizationRow::as_select())
            .order_by(organizations::name.asc())
            .into_boxed();

        if let Some(limit) = limit {
            statement = statement.limit(limit);
        }

        let rows: Vec<OrganizationRow> = statement
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_domain(rows)
    }
}
