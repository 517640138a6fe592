use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, RawQuery, State};
use axum::http::Method;
use axum::{Extension, Json};
use serde_json::Value;

use crate::api::envelope::Envelope;
use crate::api::pagination::{self, PageParams};
use crate::api::query::QueryMap;
use crate::api::versioning::ApiVersion;
use crate::auth::log_request;
use crate::error::ApiError;
use crate::middleware::auth::AuthedCaller;
use crate::services::resources::{
    create_resources, get_resource, list_resources, update_resource, PgResourceStore,
    PgUrlLookup, ResourceFilters,
};
use crate::state::AppState;
use crate::validation::{require_array, require_object, validate_resource, validate_resource_list};

use super::require_body;

pub async fn list(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    RawQuery(raw): RawQuery,
) -> Result<Envelope, ApiError> {
    let query = QueryMap::from_raw(raw.as_deref());
    let filters = ResourceFilters::from_query(&query)?;
    let params = PageParams::from_query(&query, &state.config.pagination.resources);

    let (views, total) = list_resources(&state.pool, &filters, &params).await?;
    Ok(Envelope::ok(version.0)
        .data(serde_json::to_value(views).map_err(|e| ApiError::Server(e.to_string()))?)
        .merge(pagination::details(&params, total)))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Path(id): Path<i32>,
) -> Result<Envelope, ApiError> {
    let view = get_resource(&state.pool, id).await?;
    Ok(Envelope::ok(version.0)
        .data(serde_json::to_value(view).map_err(|e| ApiError::Server(e.to_string()))?))
}

/// Batch creation. The body must be an array of resource objects; the whole
/// batch is validated before anything is written.
pub async fn create(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    AuthedCaller(caller): AuthedCaller,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Envelope, ApiError> {
    let body = require_body(body)?;
    log_request(&Method::POST, "/api/v1/resources", &caller.email, &body);

    let items = require_array(&body)?;
    let urls = PgUrlLookup::new(state.pool.clone());
    validate_resource_list(items, state.config.api.max_batch_size, &urls).await?;

    let store = PgResourceStore::new(state.pool.clone());
    let views = create_resources(
        &store,
        state.search.as_ref(),
        state.config.search.failure_policy,
        items,
    )
    .await?;
    Ok(Envelope::ok(version.0)
        .data(serde_json::to_value(views).map_err(|e| ApiError::Server(e.to_string()))?))
}

/// Partial update of a single resource. Only the provided fields change.
pub async fn update(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    AuthedCaller(caller): AuthedCaller,
    Path(id): Path<i32>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Envelope, ApiError> {
    let body = require_body(body)?;
    log_request(
        &Method::PUT,
        &format!("/api/v1/resources/{id}"),
        &caller.email,
        &body,
    );

    let payload = require_object(&body)?;
    let urls = PgUrlLookup::new(state.pool.clone());
    validate_resource(payload, false, Some(id), &urls).await?;

    let store = PgResourceStore::new(state.pool.clone());
    let view = update_resource(
        &store,
        state.search.as_ref(),
        state.config.search.failure_policy,
        id,
        payload,
    )
    .await?;
    Ok(Envelope::ok(version.0)
        .data(serde_json::to_value(view).map_err(|e| ApiError::Server(e.to_string()))?))
}
