//! Organization data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    #[error("latitude must be between -90 and 90")]
    LatitudeOutOfRange,
    #[error("longitude must be between -180 and 180")]
    LongitudeOutOfRange,
}

/// Geographic position of an organization.
///
/// A coordinate is atomic: an organization either has both latitude and
/// longitude or neither, which is why the entity holds
/// `Option<Coordinate>` rather than two independent optional fields.
/// Deserialization runs through [`Coordinate::new`], so an out-of-range
/// pair cannot be constructed from serialized input either.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Validate and construct a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// An organization that owns zero or more users.
///
/// ## Invariants
/// - `name` is non-empty.
/// - The coordinate, when present, is range-validated.
///
/// Soft-deleted rows never reach this type; repositories return live
/// records only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub coordinate: Option<Coordinate>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Merge a partial update onto this entity.
    ///
    /// Only supplied fields overwrite existing values; omitted fields are
    /// left untouched. The image URL list is replaced wholesale when
    /// supplied, not merged element-wise. Clearing a previously set
    /// optional field is unsupported.
    pub fn apply(&mut self, update: OrganizationUpdate) {
        let OrganizationUpdate {
            name,
            coordinate,
            address,
            description,
            image_urls,
        } = update;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(coordinate) = coordinate {
            self.coordinate = Some(coordinate);
        }
        if let Some(address) = address {
            self.address = Some(address);
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        if let Some(image_urls) = image_urls {
            self.image_urls = image_urls;
        }
    }
}

/// Fields required to create a new organization.
///
/// Shape validation (non-empty name, URL syntax, coordinate ranges) is the
/// inbound adapter's responsibility; by the time this type exists the
/// values are well-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrganization {
    pub name: String,
    pub coordinate: Option<Coordinate>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
}

/// Fields that can be updated on an existing organization.
///
/// Latitude and longitude must be supplied together to change the
/// coordinate, which the inbound adapter enforces before building this
/// type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationUpdate {
    pub name: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_urls: Option<Vec<String>>,
}

/// Identifier and coordinate pair for map-style listings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrganizationCoordinate {
    pub id: Uuid,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}
