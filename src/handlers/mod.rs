pub mod api_key;
pub mod catalog;
pub mod health;
pub mod resources;
pub mod search;
pub mod votes;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;

/// Unwraps a JSON body, treating an unparseable, absent, or empty body
/// (`{}`, `[]`, `null`) as missing.
pub fn require_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    let Json(value) = body.map_err(|_| ApiError::MissingBody)?;
    let empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if empty {
        return Err(ApiError::MissingBody);
    }
    Ok(value)
}

/// Catch-all for unmatched paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Fallback for matched paths hit with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
