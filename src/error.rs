use axum::{http::StatusCode, response::IntoResponse};
use serde_json::{json, Value};

use crate::api::envelope::Envelope;

/// Client-facing error taxonomy. Every variant carries a stable
/// machine-readable code surfaced in the response envelope.
#[derive(Debug)]
pub enum ApiError {
    /// Request body missing or not parseable as JSON.
    MissingBody,
    /// Body parsed but had the wrong top-level JSON shape.
    InvalidType {
        expected: &'static str,
        actual: &'static str,
    },
    /// Structured field-validation failure; carries the prebuilt errors value.
    Validation(Value),
    /// Batch exceeded the configured maximum size.
    TooLong { max: usize },
    Unauthorized(String),
    NotFound,
    MethodNotAllowed,
    UnprocessableEntity(String),
    RateLimited,
    InvalidApiVersion(String),
    /// The hosted search index rejected or never received a write.
    SearchFailed(String),
    Server(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingBody => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidType { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TooLong { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InvalidApiVersion(_) => StatusCode::BAD_REQUEST,
            ApiError::SearchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingBody => "missing-body",
            ApiError::InvalidType { .. } => "invalid-type",
            ApiError::Validation(_) => "invalid-params",
            ApiError::TooLong { .. } => "too-long",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound => "not-found",
            ApiError::MethodNotAllowed => "method-not-allowed",
            ApiError::UnprocessableEntity(_) => "unprocessable-entity",
            ApiError::RateLimited => "rate-limit-exceeded",
            ApiError::InvalidApiVersion(_) => "invalid-api-version",
            ApiError::SearchFailed(_) => "algolia-failed",
            ApiError::Server(_) => "server-error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::MissingBody => {
                "You must provide a valid JSON body to use this endpoint".to_string()
            }
            ApiError::InvalidType { expected, actual } => {
                format!("Expected a JSON {expected} but received a JSON {actual}")
            }
            ApiError::Validation(_) => "The given payload failed validation".to_string(),
            ApiError::TooLong { max } => {
                format!("A maximum of {max} resources can be created at once")
            }
            ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::NotFound => "The requested resource was not found".to_string(),
            ApiError::MethodNotAllowed => "Method not allowed on this endpoint".to_string(),
            ApiError::UnprocessableEntity(msg) => msg.clone(),
            ApiError::RateLimited => "Rate limit exceeded, try again later".to_string(),
            ApiError::InvalidApiVersion(v) => format!("'{v}' is not a supported API version"),
            ApiError::SearchFailed(msg) => msg.clone(),
            ApiError::Server(_) => "An unexpected error occurred".to_string(),
        }
    }

    /// The `errors` value placed in the response envelope. Validation errors
    /// keep the structure the validator produced; everything else is a
    /// uniform code/message list.
    pub fn errors_value(&self) -> Value {
        match self {
            ApiError::Validation(errors) => errors.clone(),
            ApiError::MissingBody => {
                json!({ "missing-body": { "message": self.message() } })
            }
            _ => json!([{ "code": self.code(), "message": self.message() }]),
        }
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("You must provide a valid API key to use this endpoint".to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::UnprocessableEntity(
                    "A resource with a conflicting unique value already exists".to_string(),
                )
            }
            _ => {
                tracing::error!("database error: {}", err);
                ApiError::Server(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if let ApiError::Server(msg) = &self {
            tracing::error!("internal error: {}", msg);
        }
        // Stamped with the latest version here; the versioning middleware
        // rewrites it to the caller's negotiated version on the way out.
        Envelope::error(crate::api::versioning::latest(), status, self.errors_value())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ApiError::MissingBody.code(), "missing-body");
        assert_eq!(ApiError::RateLimited.code(), "rate-limit-exceeded");
        assert_eq!(ApiError::SearchFailed(String::new()).code(), "algolia-failed");
        assert_eq!(ApiError::Server(String::new()).code(), "server-error");
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn server_errors_hide_internals() {
        let err = ApiError::Server("connection refused to 10.0.0.3".to_string());
        assert!(!err.message().contains("10.0.0.3"));
    }
}
