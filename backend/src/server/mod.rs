//! HTTP application assembly.
//!
//! `build_app` wires every route onto an Actix `App` so the binary and
//! the integration tests construct the exact same application.

pub mod config;

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::Error;
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::organizations::{
    batch_get_organizations, create_organization, delete_organization, get_organization,
    list_organization_coordinates, list_organizations, search_organizations, update_organization,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{
    create_user, delete_user, get_user, list_users, list_users_by_organization, search_users,
    update_user,
};

pub use config::AppConfig;

/// Assemble the Actix application: API scope, health probes and, in debug
/// builds, Swagger UI.
///
/// Route registration order matters within the scope: the fixed-path
/// routes (`search`, `coordinates`, `batch`, `organization/{org_id}`)
/// are registered before the `{id}` catch-alls so they are not shadowed.
pub fn build_app(
    state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // Malformed JSON bodies get the same error envelope as every other
    // failure instead of Actix's plain-text default.
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into());

    let api = web::scope("/api/v1")
        .app_data(state)
        .app_data(json_config)
        .service(create_organization)
        .service(list_organizations)
        .service(search_organizations)
        .service(list_organization_coordinates)
        .service(batch_get_organizations)
        .service(get_organization)
        .service(update_organization)
        .service(delete_organization)
        .service(create_user)
        .service(list_users)
        .service(search_users)
        .service(list_users_by_organization)
        .service(get_user)
        .service(update_user)
        .service(delete_user);

    #[allow(unused_mut)]
    let mut app = App::new()
        .app_data(health_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    {
        app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    app
}
