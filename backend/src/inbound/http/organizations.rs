//! Organizations API handlers.
//!
//! ```text
//! POST   /api/v1/organizations
//! GET    /api/v1/organizations
//! GET    /api/v1/organizations/search?q=acme&limit=10
//! GET    /api/v1/organizations/coordinates
//! POST   /api/v1/organizations/batch {"ids":["..."]}
//! GET    /api/v1/organizations/{id}
//! PATCH  /api/v1/organizations/{id}
//! DELETE /api/v1/organizations/{id}
//! ```

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Coordinate, Error, NewOrganization, Organization, OrganizationCoordinate, OrganizationUpdate,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    apply_rules, into_result, parse_uuid, parse_uuid_list, FieldFailure, FieldName, FieldRule,
    FieldValue, Format,
};
use crate::inbound::http::ApiResult;

const ID: FieldName = FieldName::new("id");
const IDS: FieldName = FieldName::new("ids");
const LATITUDE: FieldName = FieldName::new("latitude");
const LONGITUDE: FieldName = FieldName::new("longitude");

/// Organization representation returned by every read endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrganizationResponse {
    pub id: Uuid,
    #[schema(example = "Acme Corp")]
    pub name: String,
    #[schema(example = 13.7388)]
    pub latitude: Option<f64>,
    #[schema(example = 100.5322)]
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Organization> for OrganizationResponse {
    fn from(organization: Organization) -> Self {
        Self {
            id: organization.id,
            name: organization.name,
            latitude: organization.coordinate.map(|c| c.latitude()),
            longitude: organization.coordinate.map(|c| c.longitude()),
            address: organization.address,
            description: organization.description,
            image_urls: organization.image_urls,
            created_at: organization.created_at,
            updated_at: organization.updated_at,
        }
    }
}

fn to_responses(organizations: Vec<Organization>) -> Vec<OrganizationResponse> {
    organizations.into_iter().map(Into::into).collect()
}

/// Request body for `POST /api/v1/organizations`.
///
/// Required fields are optional at the serde level so a missing key is
/// reported by the validation table instead of a deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateOrganizationRequest {
    #[schema(example = "Acme Corp")]
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

fn text(value: &Option<String>) -> FieldValue<'_> {
    value.as_deref().map_or(FieldValue::Absent, FieldValue::Text)
}

fn number(value: Option<f64>) -> FieldValue<'static> {
    value.map_or(FieldValue::Absent, FieldValue::Number)
}

const CREATE_ORGANIZATION_RULES: &[FieldRule<CreateOrganizationRequest>] = &[
    FieldRule::required(FieldName::new("name"), Format::Text { max: 255 }, |r| {
        text(&r.name)
    }),
    FieldRule::optional(LATITUDE, Format::Latitude, |r| number(r.latitude)),
    FieldRule::optional(LONGITUDE, Format::Longitude, |r| number(r.longitude)),
    FieldRule::optional(FieldName::new("address"), Format::Text { max: 512 }, |r| {
        text(&r.address)
    }),
    FieldRule::optional(
        FieldName::new("description"),
        Format::Text { max: 2000 },
        |r| text(&r.description),
    ),
    FieldRule::optional(FieldName::new("image_urls"), Format::Url, |r| {
        FieldValue::Items(&r.image_urls)
    }),
];

/// The pair rule: a coordinate cannot arrive half-specified.
fn coordinate_pair_failure(latitude: Option<f64>, longitude: Option<f64>) -> Option<FieldFailure> {
    match (latitude, longitude) {
        (Some(_), None) => Some(FieldFailure::custom(
            LONGITUDE,
            "missing_pair",
            "longitude is required when latitude is supplied",
        )),
        (None, Some(_)) => Some(FieldFailure::custom(
            LATITUDE,
            "missing_pair",
            "latitude is required when longitude is supplied",
        )),
        _ => None,
    }
}

fn build_coordinate(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinate>, Error> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng)
            .map(Some)
            .map_err(|e| Error::validation(e.to_string())),
        _ => Ok(None),
    }
}

impl TryFrom<CreateOrganizationRequest> for NewOrganization {
    type Error = Error;

    fn try_from(request: CreateOrganizationRequest) -> Result<Self, Self::Error> {
        let mut failures = apply_rules(CREATE_ORGANIZATION_RULES, &request);
        failures.extend(coordinate_pair_failure(request.latitude, request.longitude));
        into_result(failures)?;

        let coordinate = build_coordinate(request.latitude, request.longitude)?;
        Ok(Self {
            name: request.name.unwrap_or_default(),
            coordinate,
            address: request.address,
            description: request.description,
            image_urls: request.image_urls,
        })
    }
}

/// Request body for `PATCH /api/v1/organizations/{id}`.
///
/// Every field is optional; omitted fields are left unchanged. Supplying
/// `null` is indistinguishable from omitting the key and also leaves the
/// stored value unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_urls: Option<Vec<String>>,
}

const UPDATE_ORGANIZATION_RULES: &[FieldRule<UpdateOrganizationRequest>] = &[
    FieldRule::optional(FieldName::new("name"), Format::Text { max: 255 }, |r| {
        text(&r.name)
    }),
    FieldRule::optional(LATITUDE, Format::Latitude, |r| number(r.latitude)),
    FieldRule::optional(LONGITUDE, Format::Longitude, |r| number(r.longitude)),
    FieldRule::optional(FieldName::new("address"), Format::Text { max: 512 }, |r| {
        text(&r.address)
    }),
    FieldRule::optional(
        FieldName::new("description"),
        Format::Text { max: 2000 },
        |r| text(&r.description),
    ),
    FieldRule::optional(FieldName::new("image_urls"), Format::Url, |r| {
        r.image_urls
            .as_deref()
            .map_or(FieldValue::Absent, FieldValue::Items)
    }),
];

impl TryFrom<UpdateOrganizationRequest> for OrganizationUpdate {
    type Error = Error;

    fn try_from(request: UpdateOrganizationRequest) -> Result<Self, Self::Error> {
        let mut failures = apply_rules(UPDATE_ORGANIZATION_RULES, &request);
        failures.extend(coordinate_pair_failure(request.latitude, request.longitude));
        into_result(failures)?;

        let coordinate = build_coordinate(request.latitude, request.longitude)?;
        Ok(Self {
            name: request.name,
            coordinate,
            address: request.address,
            description: request.description,
            image_urls: request.image_urls,
        })
    }
}

/// Query parameters shared by the search endpoints.
///
/// `q` defaults to the empty string at the serde level so an absent
/// parameter reaches [`SearchParams::query`] and is rejected with the
/// domain error envelope instead of an extractor error.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct SearchParams {
    /// Case-insensitive substring to match. Required and non-empty.
    #[serde(default)]
    pub q: String,
    /// Maximum result count; zero or negative means unbounded.
    pub limit: Option<i64>,
}

impl SearchParams {
    /// The search term. An absent or empty `q` is a bad request, not a
    /// full listing.
    pub fn query(&self) -> Result<&str, Error> {
        if self.q.is_empty() {
            return Err(Error::invalid_request("query parameter 'q' is required"));
        }
        Ok(&self.q)
    }
}

/// Request body for `POST /api/v1/organizations/batch`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BatchRequest {
    pub ids: Vec<String>,
}

/// Create an organization.
#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = OrganizationResponse),
        (status = 400, description = "Malformed request", body = Error),
        (status = 422, description = "Validation failure", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["organizations"],
    operation_id = "createOrganization"
)]
#[post("/organizations")]
pub async fn create_organization(
    state: web::Data<HttpState>,
    payload: web::Json<CreateOrganizationRequest>,
) -> ApiResult<HttpResponse> {
    let new = NewOrganization::try_from(payload.into_inner())?;
    let created = state.organizations.create(new).await?;
    Ok(HttpResponse::Created().json(OrganizationResponse::from(created)))
}

/// List all live organizations, most recently created first.
#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    responses(
        (status = 200, description = "Organizations", body = [OrganizationResponse]),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["organizations"],
    operation_id = "listOrganizations"
)]
#[get("/organizations")]
pub async fn list_organizations(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<OrganizationResponse>>> {
    let organizations = state.organizations.list().await?;
    Ok(web::Json(to_responses(organizations)))
}

/// Search organizations by name.
#[utoipa::path(
    get,
    path = "/api/v1/organizations/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching organizations", body = [OrganizationResponse]),
        (status = 400, description = "Missing or empty query", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["organizations"],
    operation_id = "searchOrganizations"
)]
#[get("/organizations/search")]
pub async fn search_organizations(
    state: web::Data<HttpState>,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<Vec<OrganizationResponse>>> {
    let query = params.query()?;
    let organizations = state.organizations.search(query, params.limit).await?;
    Ok(web::Json(to_responses(organizations)))
}

/// List id and coordinate pairs for organizations that have a location.
#[utoipa::path(
    get,
    path = "/api/v1/organizations/coordinates",
    responses(
        (status = 200, description = "Coordinates", body = [OrganizationCoordinate]),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["organizations"],
    operation_id = "listOrganizationCoordinates"
)]
#[get("/organizations/coordinates")]
pub async fn list_organization_coordinates(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<OrganizationCoordinate>>> {
    Ok(web::Json(state.organizations.coordinates().await?))
}

/// Fetch several organizations by id in one request.
///
/// Ids that do not resolve to a live organization are silently omitted
/// from the response.
#[utoipa::path(
    post,
    path = "/api/v1/organizations/batch",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Matching organizations", body = [OrganizationResponse]),
        (status = 400, description = "Malformed id in the list", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["organizations"],
    operation_id = "batchGetOrganizations"
)]
#[post("/organizations/batch")]
pub async fn batch_get_organizations(
    state: web::Data<HttpState>,
    payload: web::Json<BatchRequest>,
) -> ApiResult<web::Json<Vec<OrganizationResponse>>> {
    let ids = parse_uuid_list(&payload.ids, IDS)?;
    let organizations = state.organizations.get_by_ids(&ids).await?;
    Ok(web::Json(to_responses(organizations)))
}

/// Fetch one organization.
#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}",
    params(("id" = String, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Organization", body = OrganizationResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["organizations"],
    operation_id = "getOrganization"
)]
#[get("/organizations/{id}")]
pub async fn get_organization(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrganizationResponse>> {
    let id = parse_uuid(&path, ID)?;
    let organization = state
        .organizations
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found("organization not found"))?;
    Ok(web::Json(organization.into()))
}

/// Apply a partial update to an organization.
#[utoipa::path(
    patch,
    path = "/api/v1/organizations/{id}",
    params(("id" = String, Path, description = "Organization id")),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Updated organization", body = OrganizationResponse),
        (status = 400, description = "Malformed request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 422, description = "Validation failure", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["organizations"],
    operation_id = "updateOrganization"
)]
#[patch("/organizations/{id}")]
pub async fn update_organization(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateOrganizationRequest>,
) -> ApiResult<web::Json<OrganizationResponse>> {
    let id = parse_uuid(&path, ID)?;
    let update = OrganizationUpdate::try_from(payload.into_inner())?;
    let updated = state.organizations.update(id, update).await?;
    Ok(web::Json(updated.into()))
}

/// Soft-delete an organization.
///
/// Users referencing the organization are not deleted; they keep their
/// reference to the tombstoned row.
#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{id}",
    params(("id" = String, Path, description = "Organization id")),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["organizations"],
    operation_id = "deleteOrganization"
)]
#[delete("/organizations/{id}")]
pub async fn delete_organization(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    state.organizations.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn create_request() -> CreateOrganizationRequest {
        CreateOrganizationRequest {
            name: Some("Acme Corp".into()),
            latitude: Some(13.7388),
            longitude: Some(100.5322),
            address: Some("1 Main St".into()),
            description: None,
            image_urls: vec!["https://example.com/logo.png".into()],
        }
    }

    #[test]
    fn valid_create_request_converts() {
        let new = NewOrganization::try_from(create_request()).expect("convert");
        assert_eq!(new.name, "Acme Corp");
        let coordinate = new.coordinate.expect("coordinate");
        assert_eq!(coordinate.latitude(), 13.7388);
        assert_eq!(coordinate.longitude(), 100.5322);
    }

    #[test]
    fn create_without_coordinate_converts() {
        let request = CreateOrganizationRequest {
            latitude: None,
            longitude: None,
            ..create_request()
        };
        let new = NewOrganization::try_from(request).expect("convert");
        assert!(new.coordinate.is_none());
    }

    #[test]
    fn missing_name_is_a_validation_failure() {
        let request = CreateOrganizationRequest {
            name: None,
            ..create_request()
        };
        let err = NewOrganization::try_from(request).expect_err("convert should fail");
        assert_eq!(err.code(), ErrorCode::Validation);
        assert_eq!(
            err.details().expect("details")["fields"][0]["field"],
            "name"
        );
    }

    #[rstest]
    #[case(Some(13.7388), None, "longitude")]
    #[case(None, Some(100.5322), "latitude")]
    fn half_a_coordinate_is_rejected(
        #[case] latitude: Option<f64>,
        #[case] longitude: Option<f64>,
        #[case] reported_field: &str,
    ) {
        let request = CreateOrganizationRequest {
            latitude,
            longitude,
            ..create_request()
        };
        let err = NewOrganization::try_from(request).expect_err("convert should fail");
        assert_eq!(err.code(), ErrorCode::Validation);
        assert_eq!(
            err.details().expect("details")["fields"][0]["field"],
            reported_field
        );
    }

    #[test]
    fn multiple_failures_are_reported_together() {
        let request = CreateOrganizationRequest {
            name: None,
            latitude: Some(91.0),
            longitude: Some(181.0),
            image_urls: vec!["no scheme".into()],
            ..create_request()
        };
        let err = NewOrganization::try_from(request).expect_err("convert should fail");
        let fields = err.details().expect("details")["fields"]
            .as_array()
            .expect("fields array")
            .len();
        assert_eq!(fields, 4);
    }

    #[test]
    fn update_request_with_no_fields_is_valid() {
        let update =
            OrganizationUpdate::try_from(UpdateOrganizationRequest::default()).expect("convert");
        assert_eq!(update, OrganizationUpdate::default());
    }

    #[test]
    fn update_request_keeps_unsupplied_fields_unset() {
        let update = OrganizationUpdate::try_from(UpdateOrganizationRequest {
            name: Some("Acme Ltd".into()),
            ..UpdateOrganizationRequest::default()
        })
        .expect("convert");
        assert_eq!(update.name.as_deref(), Some("Acme Ltd"));
        assert!(update.coordinate.is_none());
        assert!(update.image_urls.is_none());
    }

    #[test]
    fn search_requires_a_non_empty_query() {
        let err = SearchParams::default().query().expect_err("empty query");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);

        let params = SearchParams {
            q: "acme".into(),
            limit: None,
        };
        assert_eq!(params.query().expect("query"), "acme");
    }

    #[test]
    fn response_flattens_the_coordinate() {
        let new = NewOrganization::try_from(create_request()).expect("convert");
        let now = chrono::Utc::now();
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

        let value =
            serde_json::to_value(OrganizationResponse::from(organization)).expect("serialize");
        assert_eq!(value["latitude"], 13.7388);
        assert_eq!(value["longitude"], 100.5322);
        assert!(value.get("coordinate").is_none());
    }
}
