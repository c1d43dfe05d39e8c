//! Users API handlers.
//!
//! ```text
//! POST   /api/v1/users
//! GET    /api/v1/users
//! GET    /api/v1/users/search?q=ada&limit=10
//! GET    /api/v1/users/organization/{org_id}
//! GET    /api/v1/users/{id}
//! PATCH  /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! ```

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, NewUser, User, UserUpdate};
use crate::inbound::http::organizations::SearchParams;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    apply_rules, into_result, parse_uuid, FieldName, FieldRule, FieldValue, Format,
};
use crate::inbound::http::ApiResult;

const ID: FieldName = FieldName::new("id");
const ORGANIZATION_ID: FieldName = FieldName::new("organization_id");

/// User representation returned by every read endpoint.
///
/// The password hash has no field here, so it cannot leak into responses.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "John Doe")]
    pub name: String,
    pub organization_id: Uuid,
    pub is_admin: bool,
    pub phone_number: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub research_categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            organization_id: user.organization_id,
            is_admin: user.is_admin,
            phone_number: user.phone_number,
            social_media: user.social_media,
            description: user.description,
            avatar_url: user.avatar_url,
            research_categories: user.research_categories,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn to_responses(users: Vec<User>) -> Vec<UserResponse> {
    users.into_iter().map(Into::into).collect()
}

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "user@example.com")]
    pub email: Option<String>,
    #[schema(example = "John Doe")]
    pub name: Option<String>,
    pub organization_id: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub phone_number: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub research_categories: Vec<String>,
}

fn text(value: &Option<String>) -> FieldValue<'_> {
    value.as_deref().map_or(FieldValue::Absent, FieldValue::Text)
}

const CREATE_USER_RULES: &[FieldRule<CreateUserRequest>] = &[
    FieldRule::required(FieldName::new("email"), Format::Email, |r| text(&r.email)),
    FieldRule::required(FieldName::new("name"), Format::Text { max: 255 }, |r| {
        text(&r.name)
    }),
    FieldRule::required(ORGANIZATION_ID, Format::Text { max: 64 }, |r| {
        text(&r.organization_id)
    }),
    FieldRule::required(FieldName::new("password"), Format::Text { max: 255 }, |r| {
        text(&r.password)
    }),
    FieldRule::optional(FieldName::new("phone_number"), Format::PhoneE164, |r| {
        text(&r.phone_number)
    }),
    FieldRule::optional(
        FieldName::new("social_media"),
        Format::Text { max: 255 },
        |r| text(&r.social_media),
    ),
    FieldRule::optional(
        FieldName::new("description"),
        Format::Text { max: 2000 },
        |r| text(&r.description),
    ),
    FieldRule::optional(FieldName::new("avatar_url"), Format::Url, |r| {
        text(&r.avatar_url)
    }),
    FieldRule::optional(
        FieldName::new("research_categories"),
        Format::Text { max: 255 },
        |r| FieldValue::Items(&r.research_categories),
    ),
];

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = Error;

    fn try_from(request: CreateUserRequest) -> Result<Self, Self::Error> {
        into_result(apply_rules(CREATE_USER_RULES, &request))?;

        let organization_id = parse_uuid(
            request.organization_id.as_deref().unwrap_or_default(),
            ORGANIZATION_ID,
        )?;
        Ok(Self {
            email: request.email.unwrap_or_default(),
            name: request.name.unwrap_or_default(),
            organization_id,
            password: request.password.unwrap_or_default(),
            is_admin: request.is_admin,
            phone_number: request.phone_number,
            social_media: request.social_media,
            description: request.description,
            avatar_url: request.avatar_url,
            research_categories: request.research_categories,
        })
    }
}

/// Request body for `PATCH /api/v1/users/{id}`.
///
/// Every field is optional; omitted fields are left unchanged. A supplied
/// password is re-hashed by the service before persisting.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub organization_id: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
    pub phone_number: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub research_categories: Option<Vec<String>>,
}

const UPDATE_USER_RULES: &[FieldRule<UpdateUserRequest>] = &[
    FieldRule::optional(FieldName::new("email"), Format::Email, |r| text(&r.email)),
    FieldRule::optional(FieldName::new("name"), Format::Text { max: 255 }, |r| {
        text(&r.name)
    }),
    FieldRule::optional(ORGANIZATION_ID, Format::Text { max: 64 }, |r| {
        text(&r.organization_id)
    }),
    FieldRule::optional(FieldName::new("password"), Format::Text { max: 255 }, |r| {
        text(&r.password)
    }),
    FieldRule::optional(FieldName::new("phone_number"), Format::PhoneE164, |r| {
        text(&r.phone_number)
    }),
    FieldRule::optional(
        FieldName::new("social_media"),
        Format::Text { max: 255 },
        |r| text(&r.social_media),
    ),
    FieldRule::optional(
        FieldName::new("description"),
        Format::Text { max: 2000 },
        |r| text(&r.description),
    ),
    FieldRule::optional(FieldName::new("avatar_url"), Format::Url, |r| {
        text(&r.avatar_url)
    }),
    FieldRule::optional(
        FieldName::new("research_categories"),
        Format::Text { max: 255 },
        |r| {
            r.research_categories
                .as_deref()
                .map_or(FieldValue::Absent, FieldValue::Items)
        },
    ),
];

impl TryFrom<UpdateUserRequest> for UserUpdate {
    type Error = Error;

    fn try_from(request: UpdateUserRequest) -> Result<Self, Self::Error> {
        into_result(apply_rules(UPDATE_USER_RULES, &request))?;

        let organization_id = request
            .organization_id
            .as_deref()
            .map(|raw| parse_uuid(raw, ORGANIZATION_ID))
            .transpose()?;
        Ok(Self {
            email: request.email,
            name: request.name,
            organization_id,
            password: request.password,
            is_admin: request.is_admin,
            phone_number: request.phone_number,
            social_media: request.social_media,
            description: request.description,
            avatar_url: request.avatar_url,
            research_categories: request.research_categories,
        })
    }
}

/// Create a user.
///
/// The referenced organization must be live; the password is hashed
/// before anything is written.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Malformed request", body = Error),
        (status = 404, description = "Referenced organization not found", body = Error),
        (status = 409, description = "Email already in use", body = Error),
        (status = 422, description = "Validation failure", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let new = NewUser::try_from(payload.into_inner())?;
    let created = state.users.create(new).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(created)))
}

/// List all live users, most recently created first.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users.list().await?;
    Ok(web::Json(to_responses(users)))
}

/// Search users by name or email.
#[utoipa::path(
    get,
    path = "/api/v1/users/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching users", body = [UserResponse]),
        (status = 400, description = "Missing or empty query", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "searchUsers"
)]
#[get("/users/search")]
pub async fn search_users(
    state: web::Data<HttpState>,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let query = params.query()?;
    let users = state.users.search(query, params.limit).await?;
    Ok(web::Json(to_responses(users)))
}

/// List the users belonging to one organization.
#[utoipa::path(
    get,
    path = "/api/v1/users/organization/{org_id}",
    params(("org_id" = String, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Users in the organization", body = [UserResponse]),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Organization not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsersByOrganization"
)]
#[get("/users/organization/{org_id}")]
pub async fn list_users_by_organization(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let organization_id = parse_uuid(&path, ORGANIZATION_ID)?;
    let users = state.users.list_by_organization(organization_id).await?;
    Ok(web::Json(to_responses(users)))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_uuid(&path, ID)?;
    let user = state
        .users
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(web::Json(user.into()))
}

/// Apply a partial update to a user.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Malformed request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Email already in use", body = Error),
        (status = 422, description = "Validation failure", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_uuid(&path, ID)?;
    let update = UserUpdate::try_from(payload.into_inner())?;
    let updated = state.users.update(id, update).await?;
    Ok(web::Json(updated.into()))
}

/// Soft-delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    state.users.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::Value;

    fn create_request() -> CreateUserRequest {
        CreateUserRequest {
            email: Some("user@example.com".into()),
            name: Some("John Doe".into()),
            organization_id: Some(Uuid::new_v4().to_string()),
            password: Some("correct horse battery staple".into()),
            is_admin: false,
            phone_number: Some("+15551234567".into()),
            social_media: None,
            description: None,
            avatar_url: Some("https://example.com/a.png".into()),
            research_categories: vec!["geology".into()],
        }
    }

    #[test]
    fn valid_create_request_converts() {
        let new = NewUser::try_from(create_request()).expect("convert");
        assert_eq!(new.email, "user@example.com");
        assert_eq!(new.password, "correct horse battery staple");
    }

    #[rstest]
    #[case("email")]
    #[case("name")]
    #[case("organization_id")]
    #[case("password")]
    fn each_required_field_is_enforced(#[case] field: &str) {
        let mut request = create_request();
        match field {
            "email" => request.email = None,
            "name" => request.name = None,
            "organization_id" => request.organization_id = None,
            _ => request.password = None,
        }

        let err = NewUser::try_from(request).expect_err("convert should fail");
        assert_eq!(err.code(), ErrorCode::Validation);
        assert_eq!(err.details().expect("details")["fields"][0]["field"], field);
    }

    #[rstest]
    #[case("not-an-email", "email", "invalid_email")]
    #[case("user@example.com", "phone_number", "invalid_phone")]
    fn format_violations_are_reported(
        #[case] email: &str,
        #[case] reported_field: &str,
        #[case] code: &str,
    ) {
        let mut request = create_request();
        if reported_field == "email" {
            request.email = Some(email.into());
        } else {
            request.phone_number = Some("555-1234".into());
        }

        let err = NewUser::try_from(request).expect_err("convert should fail");
        let first = &err.details().expect("details")["fields"][0];
        assert_eq!(first["field"], reported_field);
        assert_eq!(first["code"], code);
    }

    #[test]
    fn malformed_organization_id_is_a_bad_request() {
        let request = CreateUserRequest {
            organization_id: Some("not-a-uuid".into()),
            ..create_request()
        };
        let err = NewUser::try_from(request).expect_err("convert should fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn update_request_with_no_fields_is_valid() {
        let update = UserUpdate::try_from(UpdateUserRequest::default()).expect("convert");
        assert_eq!(update, UserUpdate::default());
    }

    #[test]
    fn update_request_parses_a_supplied_organization_id() {
        let organization_id = Uuid::new_v4();
        let update = UserUpdate::try_from(UpdateUserRequest {
            organization_id: Some(organization_id.to_string()),
            ..UpdateUserRequest::default()
        })
        .expect("convert");
        assert_eq!(update.organization_id, Some(organization_id));
    }

    #[test]
    fn response_carries_no_password_material() {
        let now = chrono::Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "user@example.com".into(),
            name: "John Doe".into(),
            organization_id: Uuid::new_v4(),
            is_admin: false,
            phone_number: None,
            social_media: None,
            description: None,
            avatar_url: None,
            research_categories: Vec::new(),
            password_hash: "$argon2id$stub".into(),
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(UserResponse::from(user)).expect("serialize");
        assert!(value.get("password").is_none());
        assert!(value.get("password_hash").is_none());
        assert_eq!(
            value.get("email").and_then(Value::as_str),
            Some("user@example.com")
        );
    }
}
