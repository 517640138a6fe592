use axum::extract::{RawQuery, State};
use axum::Extension;
use serde_json::{json, Map, Value};

use crate::api::envelope::Envelope;
use crate::api::query::QueryMap;
use crate::api::versioning::ApiVersion;
use crate::error::ApiError;
use crate::search::{build_filter_string, SearchQuery};
use crate::state::AppState;
use crate::validation::coerce_flag;

/// Full-text search proxied to the hosted index. Pages here are 0-based,
/// matching the provider's paging.
pub async fn search(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    RawQuery(raw): RawQuery,
) -> Result<Envelope, ApiError> {
    let query = QueryMap::from_raw(raw.as_deref());
    let config = &state.config.pagination.resources;

    let term = query.get("q").unwrap_or_default().to_string();
    let page = query.get_u32("page").unwrap_or(0);
    let page_size = query
        .get_u32("page_size")
        .unwrap_or(config.per_page)
        .min(config.max_page_size);

    let paid = query.get("paid").and_then(|raw| coerce_flag(&Value::from(raw)));
    let category = query.get("category");
    let languages: Vec<String> = query
        .get_all("languages")
        .into_iter()
        .map(str::to_string)
        .collect();

    let request = SearchQuery {
        term,
        page,
        page_size,
        filters: build_filter_string(paid, category, &languages),
    };

    let results = state.search.search(&request).await.map_err(|err| {
        tracing::error!("search query failed: {}", err);
        ApiError::SearchFailed("Failed to get resources from Algolia".to_string())
    })?;

    if request.page >= results.total_pages {
        return Err(ApiError::NotFound);
    }

    let hits: Vec<Value> = results.hits.iter().map(strip_internal_keys).collect();

    let mut extra = Map::new();
    extra.insert(
        "details".to_string(),
        json!({
            "page": request.page,
            "number_of_pages": results.total_pages,
            "records_per_page": request.page_size,
            "total_count": results.total_hits,
        }),
    );
    Ok(Envelope::ok(version.0).data(Value::from(hits)).merge(extra))
}

/// Drops provider bookkeeping keys (highlighting, ranking) from a hit.
fn strip_internal_keys(hit: &Value) -> Value {
    match hit {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !key.starts_with('_'))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}
