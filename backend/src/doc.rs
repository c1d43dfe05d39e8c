//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: every HTTP endpoint from the inbound layer plus the
//! request and response schemas. The generated document backs Swagger UI
//! in debug builds.

use utoipa::OpenApi;

use crate::domain::{Coordinate, Error, ErrorCode, OrganizationCoordinate};
use crate::inbound::http::organizations::{
    BatchRequest, CreateOrganizationRequest, OrganizationResponse, UpdateOrganizationRequest,
};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest, UserResponse};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Customer API",
        description = "REST API for managing users and organizations."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::organizations::create_organization,
        crate::inbound::http::organizations::list_organizations,
        crate::inbound::http::organizations::search_organizations,
        crate::inbound::http::organizations::list_organization_coordinates,
        crate::inbound::http::organizations::batch_get_organizations,
        crate::inbound::http::organizations::get_organization,
        crate::inbound::http::organizations::update_organization,
        crate::inbound::http::organizations::delete_organization,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::search_users,
        crate::inbound::http::users::list_users_by_organization,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Coordinate,
        OrganizationCoordinate,
        OrganizationResponse,
        CreateOrganizationRequest,
        UpdateOrganizationRequest,
        BatchRequest,
        UserResponse,
        CreateUserRequest,
        UpdateUserRequest,
    )),
    tags(
        (name = "organizations", description = "Operations on organizations"),
        (name = "users", description = "Operations on users"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
