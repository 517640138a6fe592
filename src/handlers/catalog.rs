use axum::extract::{Path, RawQuery, State};
use axum::Extension;

use crate::api::envelope::Envelope;
use crate::api::pagination::{self, PageParams};
use crate::api::query::QueryMap;
use crate::api::versioning::ApiVersion;
use crate::error::ApiError;
use crate::services::catalog;
use crate::state::AppState;

pub async fn list_languages(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    RawQuery(raw): RawQuery,
) -> Result<Envelope, ApiError> {
    let query = QueryMap::from_raw(raw.as_deref());
    let params = PageParams::from_query(&query, &state.config.pagination.languages);
    let (languages, total) = catalog::list_languages(&state.pool, &params).await?;
    Ok(Envelope::ok(version.0)
        .data(serde_json::to_value(languages).map_err(|e| ApiError::Server(e.to_string()))?)
        .merge(pagination::details(&params, total)))
}

pub async fn show_language(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Path(id): Path<i32>,
) -> Result<Envelope, ApiError> {
    let language = catalog::get_language(&state.pool, id).await?;
    Ok(Envelope::ok(version.0)
        .data(serde_json::to_value(language).map_err(|e| ApiError::Server(e.to_string()))?))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    RawQuery(raw): RawQuery,
) -> Result<Envelope, ApiError> {
    let query = QueryMap::from_raw(raw.as_deref());
    let params = PageParams::from_query(&query, &state.config.pagination.categories);
    let (categories, total) = catalog::list_categories(&state.pool, &params).await?;
    Ok(Envelope::ok(version.0)
        .data(serde_json::to_value(categories).map_err(|e| ApiError::Server(e.to_string()))?)
        .merge(pagination::details(&params, total)))
}

pub async fn show_category(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Path(id): Path<i32>,
) -> Result<Envelope, ApiError> {
    let category = catalog::get_category(&state.pool, id).await?;
    Ok(Envelope::ok(version.0)
        .data(serde_json::to_value(category).map_err(|e| ApiError::Server(e.to_string()))?))
}
