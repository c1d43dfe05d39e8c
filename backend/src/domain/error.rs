//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses; the mapping lives in `inbound::http::error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed (bad JSON, bad identifier).
    InvalidRequest,
    /// The request decoded but failed field-level validation.
    Validation,
    /// The requested resource does not exist or is soft-deleted.
    NotFound,
    /// A referenced organization does not exist or is soft-deleted.
    ///
    /// Raised by the user pipeline so callers can report the missing
    /// *organization* rather than the user they were operating on.
    OrganizationNotFound,
    /// A uniqueness constraint was violated (duplicate email).
    Conflict,
    /// The persistence backend could not be reached.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// Carries a stable [`ErrorCode`], a human-readable message, and optional
/// structured details (e.g. per-field validation failures).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub struct Error {
    #[schema(example = "not_found")]
    code: ErrorCode,
    #[schema(example = "organization not found")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error from a code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::OrganizationNotFound`].
    pub fn organization_not_found() -> Self {
        Self::new(ErrorCode::OrganizationNotFound, "organization not found")
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn codes_serialize_as_snake_case() {
        let value = serde_json::to_value(ErrorCode::OrganizationNotFound).expect("serialize code");
        assert_eq!(value, json!("organization_not_found"));
    }

    #[test]
    fn details_are_omitted_when_absent() {
        let err = Error::not_found("user not found");
        let value = serde_json::to_value(&err).expect("serialize error");
        assert_eq!(
            value,
            json!({ "code": "not_found", "message": "user not found" })
        );
    }

    #[test]
    fn details_round_trip() {
        let err = Error::validation("invalid fields")
            .with_details(json!({ "fields": [{ "field": "email" }] }));
        let value = serde_json::to_value(&err).expect("serialize error");
        assert_eq!(value["details"]["fields"][0]["field"], json!("email"));
    }

    #[test]
    fn organization_not_found_is_distinct_from_not_found() {
        assert_ne!(
            Error::organization_not_found().code(),
            Error::not_found("user not found").code(),
        );
    }
}
