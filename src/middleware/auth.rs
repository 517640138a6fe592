use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::keys::{KeyError, KeyStore};
use crate::auth::{bearer_token, TokenVerifier};
use crate::error::ApiError;
use crate::models::key::Key;
use crate::state::AppState;

/// Extractor for endpoints that require an authenticated caller. Accepts an
/// active API key via `x-apikey`, or a bearer token from the membership
/// service; a verified token auto-provisions a key the first time.
pub struct AuthedCaller(pub Key);

/// Extractor for endpoints that work anonymously but behave differently when
/// the caller can be identified (tracked voting).
pub struct MaybeCaller(pub Option<Key>);

async fn resolve_caller(
    parts: &Parts,
    keys: &dyn KeyStore,
    verifier: &TokenVerifier,
) -> Result<Option<Key>, ApiError> {
    if let Some(apikey) = parts
        .headers
        .get("x-apikey")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(key) = keys.find_active(apikey).await.map_err(key_failure)? {
            return Ok(Some(key));
        }
        // Invalid or denied keys fall through to the bearer path.
    }

    let Some(token) = bearer_token(&parts.headers) else {
        return Ok(None);
    };
    let claims = match verifier.verify(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!("bearer token rejected: {}", err);
            return Ok(None);
        }
    };

    match keys.find_by_email(&claims.email).await.map_err(key_failure)? {
        Some(key) if key.denied => Err(ApiError::unauthorized()),
        Some(key) => Ok(Some(key)),
        None => {
            let key = keys.issue(&claims.email).await.map_err(key_failure)?;
            tracing::info!(email = %claims.email, "provisioned api key for verified member");
            Ok(Some(key))
        }
    }
}

fn key_failure(err: KeyError) -> ApiError {
    match err {
        KeyError::Database(db) => db.into(),
        other => ApiError::Server(other.to_string()),
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthedCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_caller(parts, state.keys.as_ref(), &state.verifier).await? {
            Some(key) => Ok(AuthedCaller(key)),
            None => Err(ApiError::unauthorized()),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeCaller(
            resolve_caller(parts, state.keys.as_ref(), &state.verifier).await?,
        ))
    }
}
