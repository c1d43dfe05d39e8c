//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Row-to-domain conversion re-establishes
//! the domain invariants the relational shape cannot express (the atomic
//! coordinate pair).

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{Coordinate, Organization, User};

use super::schema::{organizations, users};

/// Row struct for reading from the organizations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganizationRow {
    pub id: Uuid,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Decode the two nullable columns into the atomic domain pair.
fn decode_coordinate(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinate>, String> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng)
            .map(Some)
            .map_err(|e| format!("stored coordinate out of range: {e}")),
        _ => Err("organization row has a partial coordinate".into()),
    }
}

impl OrganizationRow {
    pub(crate) fn into_domain(self) -> Result<Organization, String> {
        let coordinate = decode_coordinate(self.latitude, self.longitude)?;
        Ok(Organization {
            id: self.id,
            name: self.name,
            coordinate,
            address: self.address,
            description: self.description,
            image_urls: self.image_urls,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating new organization records.
///
/// `id`, `created_at`, and `updated_at` are generated by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = organizations)]
pub(crate) struct NewOrganizationRow<'a> {
    pub name: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<&'a str>,
    pub description: Option<&'a str>,
    pub image_urls: &'a [String],
}

/// Changeset struct persisting a merged organization entity.
///
/// The service merges field-by-field; by the time this changeset is built
/// every mutable column carries its post-merge value, so the write is a
/// single atomic update statement. `None` optional columns are skipped by
/// Diesel, which is equivalent here: the merge never clears a stored
/// value, so a `None` field is `NULL` in the database already.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = organizations)]
pub(crate) struct OrganizationChangeset<'a> {
    pub name: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<&'a str>,
    pub description: Option<&'a str>,
    pub image_urls: &'a [String],
    pub updated_at: DateTime<Utc>,
}

impl<'a> OrganizationChangeset<'a> {
    pub(crate) fn from_entity(organization: &'a Organization) -> Self {
        Self {
            name: &organization.name,
            latitude: organization.coordinate.map(|c| c.latitude()),
            longitude: organization.coordinate.map(|c| c.longitude()),
            address: organization.address.as_deref(),
            description: organization.description.as_deref(),
            image_urls: &organization.image_urls,
            updated_at: Utc::now(),
        }
    }
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub organization_id: Uuid,
    pub is_admin: bool,
    pub phone_number: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub research_categories: Vec<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            organization_id: self.organization_id,
            is_admin: self.is_admin,
            phone_number: self.phone_number,
            social_media: self.social_media,
            description: self.description,
            avatar_url: self.avatar_url,
            research_categories: self.research_categories,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub organization_id: Uuid,
    pub is_admin: bool,
    pub phone_number: Option<&'a str>,
    pub social_media: Option<&'a str>,
    pub description: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub research_categories: &'a [String],
    pub password_hash: &'a str,
}

/// Changeset struct persisting a merged user entity.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub organization_id: Uuid,
    pub is_admin: bool,
    pub phone_number: Option<&'a str>,
    pub social_media: Option<&'a str>,
    pub description: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub research_categories: &'a [String],
    pub password_hash: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> UserChangeset<'a> {
    pub(crate) fn from_entity(user: &'a User) -> Self {
        Self {
            email: &user.email,
            name: &user.name,
            organization_id: user.organization_id,
            is_admin: user.is_admin,
            phone_number: user.phone_number.as_deref(),
            social_media: user.social_media.as_deref(),
            description: user.description.as_deref(),
            avatar_url: user.avatar_url.as_deref(),
            research_categories: &user.research_categories,
            password_hash: &user.password_hash,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_coordinate_is_rejected() {
        assert!(decode_coordinate(Some(1.0), None).is_err());
        assert!(decode_coordinate(None, Some(1.0)).is_err());
    }

    #[test]
    fn absent_coordinate_decodes_to_none() {
        assert_eq!(decode_coordinate(None, None), Ok(None));
    }

    #[test]
    fn full_coordinate_decodes() {
        let coordinate = decode_coordinate(Some(13.7388), Some(100.5322))
            .expect("decode")
            .expect("present");
        assert_eq!(coordinate.latitude(), 13.7388);
    }

    #[test]
    fn out_of_range_stored_coordinate_is_an_error() {
        assert!(decode_coordinate(Some(91.0), Some(0.0)).is_err());
    }
}
