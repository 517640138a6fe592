use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::Method;
use axum::{Extension, Json};
use serde_json::Value;

use crate::api::envelope::Envelope;
use crate::api::versioning::ApiVersion;
use crate::auth::log_request;
use crate::error::ApiError;
use crate::middleware::auth::AuthedCaller;
use crate::state::AppState;

use super::require_body;

const BAD_CREDENTIALS: &str =
    "The email or password you submitted is incorrect or your account is not allowed api access";

/// Exchanges membership credentials for an API key. Returns the caller's
/// existing key when one is already on file; denied keys never come back.
pub async fn issue(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Envelope, ApiError> {
    let body = require_body(body)?;
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let is_member = state
        .membership
        .verify_membership(email, password)
        .await
        .map_err(|err| {
            tracing::error!("membership verification failed: {}", err);
            ApiError::Server(err.to_string())
        })?;
    if !is_member {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let key = match state.keys.find_by_email(email).await.map_err(store_failure)? {
        Some(key) if key.denied => return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string())),
        Some(key) => key,
        None => {
            let key = state.keys.issue(email).await.map_err(store_failure)?;
            tracing::info!(email, "issued new api key");
            key
        }
    };

    Ok(Envelope::ok(version.0).data(key.serialize()))
}

/// Replaces the caller's key with a fresh token, invalidating the old one.
pub async fn rotate(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    AuthedCaller(caller): AuthedCaller,
) -> Result<Envelope, ApiError> {
    log_request(
        &Method::POST,
        "/api/v1/apikey/rotate",
        &caller.email,
        &Value::Null,
    );
    let rotated = state.keys.rotate(&caller).await.map_err(store_failure)?;
    tracing::info!(email = %rotated.email, "rotated api key");
    Ok(Envelope::ok(version.0).data(rotated.serialize()))
}

fn store_failure(err: crate::auth::keys::KeyError) -> ApiError {
    match err {
        crate::auth::keys::KeyError::Database(db) => db.into(),
        other => ApiError::Server(other.to_string()),
    }
}
