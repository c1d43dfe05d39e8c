//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::NotFound | ErrorCode::OrganizationNotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        Error::internal("Internal server error")
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = self.message(), "internal error surfaced to client");
        }
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(Error::invalid_request("bad json"), StatusCode::BAD_REQUEST)]
    #[case(Error::validation("invalid fields"), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(Error::not_found("user not found"), StatusCode::NOT_FOUND)]
    #[case(Error::organization_not_found(), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("email already in use"), StatusCode::CONFLICT)]
    #[case(
        Error::service_unavailable("pool exhausted"),
        StatusCode::SERVICE_UNAVAILABLE
    )]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_codes_follow_the_error_code(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let response = Error::internal("connection string was postgres://secret").error_response();
        let body = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("body");
        let value: Value = serde_json::from_slice(&body).expect("error payload");
        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some("Internal server error")
        );
    }

    #[actix_web::test]
    async fn non_internal_errors_keep_their_message_and_code() {
        let response = Error::organization_not_found().error_response();
        let body = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("body");
        let value: Value = serde_json::from_slice(&body).expect("error payload");
        assert_eq!(
            value.get("code").and_then(Value::as_str),
            Some("organization_not_found")
        );
        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some("organization not found")
        );
    }
}
