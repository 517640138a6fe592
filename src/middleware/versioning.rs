use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::api::versioning::{negotiate, ApiVersion};
use crate::error::ApiError;
use crate::state::AppState;

/// Negotiates the `X-API-Version` header, stashes the outcome in request
/// extensions so handlers can stamp their envelopes with it, and rewrites
/// the `apiVersion` field on the way out. Error envelopes are built without
/// the request at hand and default to the latest version, so the rewrite is
/// what keeps them honest for callers pinned to an older one.
pub async fn negotiate_version(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let version = negotiate(request.headers(), state.config.api.strict_versioning)?;
    request.extensions_mut().insert(version);
    let response = next.run(request).await;
    Ok(restamp_version(response, version).await)
}

async fn restamp_version(response: Response, version: ApiVersion) -> Response {
    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    let restamped = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|mut envelope| {
            let object = envelope.as_object_mut()?;
            let stamped = object.get("apiVersion")?.as_f64()?;
            if stamped == version.0 {
                return None;
            }
            object.insert("apiVersion".to_string(), Value::from(version.0));
            serde_json::to_vec(&envelope).ok()
        });

    match restamped {
        Some(body) => {
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        }
        None => Response::from_parts(parts, Body::from(bytes)),
    }
}
