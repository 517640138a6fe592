use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::api::pagination::{self, PageParams};
use crate::api::query::QueryMap;
use crate::config::SearchFailurePolicy;
use crate::error::ApiError;
use crate::models::resource::ResourceView;
use crate::search::{SearchError, SearchIndex};
use crate::validation::{coerce_flag, coerce_languages, coerce_text, UrlLookup};

/// Columns selected for every [`ResourceView`], with category and languages
/// denormalized in SQL.
const VIEW_COLUMNS: &str = "\
    r.id, r.name, r.url, c.name AS category, \
    COALESCE((SELECT array_agg(l.name ORDER BY l.name) \
        FROM language l \
        JOIN language_identifier li ON li.language_id = l.id \
        WHERE li.resource_id = r.id), '{}') AS languages, \
    r.paid, r.notes, r.upvotes, r.downvotes, r.times_clicked, \
    r.created_at, r.last_updated";

/// Query-string filters accepted by the resource listing.
#[derive(Debug, Default, Clone)]
pub struct ResourceFilters {
    pub languages: Vec<String>,
    pub category: Option<String>,
    pub updated_after: Option<DateTime<Utc>>,
    pub paid: Option<bool>,
}

impl ResourceFilters {
    pub fn from_query(query: &QueryMap) -> Result<Self, ApiError> {
        let updated_after = match query.get("updated_after") {
            Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| {
                ApiError::UnprocessableEntity(
                    "The value for \"updated_after\" is invalid".to_string(),
                )
            })?),
            None => None,
        };

        Ok(Self {
            languages: query
                .get_all("languages")
                .into_iter()
                .map(str::to_string)
                .collect(),
            category: query.get("category").map(str::to_string),
            updated_after,
            paid: query.get("paid").and_then(|raw| coerce_flag(&Value::from(raw))),
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default()))
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &ResourceFilters) {
    if !filters.languages.is_empty() {
        let lowered: Vec<String> = filters
            .languages
            .iter()
            .map(|lang| lang.to_lowercase())
            .collect();
        builder.push(
            " AND EXISTS (SELECT 1 FROM language_identifier li \
             JOIN language l ON l.id = li.language_id \
             WHERE li.resource_id = r.id AND lower(l.name) = ANY(",
        );
        builder.push_bind(lowered);
        builder.push("))");
    }
    if let Some(category) = &filters.category {
        builder.push(" AND lower(c.name) = lower(");
        builder.push_bind(category.clone());
        builder.push(")");
    }
    if let Some(cutoff) = filters.updated_after {
        builder.push(" AND (r.created_at >= ");
        builder.push_bind(cutoff);
        builder.push(" OR r.last_updated >= ");
        builder.push_bind(cutoff);
        builder.push(")");
    }
    if let Some(paid) = filters.paid {
        builder.push(" AND r.paid = ");
        builder.push_bind(paid);
    }
}

/// Paginated, filtered listing. A page past the end of the filtered set is a
/// not-found, except page 1 of an empty set which returns an empty list.
pub async fn list_resources(
    pool: &PgPool,
    filters: &ResourceFilters,
    params: &PageParams,
) -> Result<(Vec<ResourceView>, i64), ApiError> {
    let mut count = QueryBuilder::new(
        "SELECT COUNT(*) FROM resource r JOIN category c ON c.id = r.category_id WHERE TRUE",
    );
    push_filters(&mut count, filters);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let window = pagination::window(params, total).ok_or(ApiError::NotFound)?;

    let mut select = QueryBuilder::new(format!(
        "SELECT {VIEW_COLUMNS} FROM resource r JOIN category c ON c.id = r.category_id WHERE TRUE"
    ));
    push_filters(&mut select, filters);
    select.push(" ORDER BY r.id LIMIT ");
    select.push_bind(window.limit);
    select.push(" OFFSET ");
    select.push_bind(window.offset);

    let views = select.build_query_as::<ResourceView>().fetch_all(pool).await?;
    Ok((views, total))
}

pub async fn get_resource(pool: &PgPool, id: i32) -> Result<ResourceView, ApiError> {
    fetch_view(pool, id).await?.ok_or(ApiError::NotFound)
}

/// Every resource in id order, used by the reindexing job.
pub async fn all_views(pool: &PgPool) -> Result<Vec<ResourceView>, ApiError> {
    let views = sqlx::query_as::<_, ResourceView>(&format!(
        "SELECT {VIEW_COLUMNS} FROM resource r \
         JOIN category c ON c.id = r.category_id ORDER BY r.id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(views)
}

async fn fetch_view(pool: &PgPool, id: i32) -> Result<Option<ResourceView>, ApiError> {
    let view = sqlx::query_as::<_, ResourceView>(&format!(
        "SELECT {VIEW_COLUMNS} FROM resource r \
         JOIN category c ON c.id = r.category_id WHERE r.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(view)
}

/// URL uniqueness checks for the validator, backed by the resource table.
pub struct PgUrlLookup {
    pool: PgPool,
}

impl PgUrlLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlLookup for PgUrlLookup {
    async fn resource_id_for_url(&self, url: &str) -> Result<Option<i32>, ApiError> {
        let id: Option<i32> = sqlx::query_scalar("SELECT id FROM resource WHERE url = $1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}

/// The subset of a resource an update may touch, extracted from a validated
/// payload with the same truthiness rules the validator applies: empty
/// strings and empty language lists read as "leave it alone", while `paid`
/// and `notes` change whenever the key is present (`notes: null` clears).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChangeSet {
    pub name: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub paid: Option<bool>,
    pub notes: Option<Option<String>>,
    pub languages: Option<Vec<String>>,
}

impl ChangeSet {
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self {
            name: payload
                .get("name")
                .and_then(coerce_text)
                .filter(|name| !name.is_empty()),
            url: payload
                .get("url")
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            category: payload
                .get("category")
                .filter(|value| !value.is_null())
                .and_then(coerce_text)
                .filter(|name| !name.is_empty()),
            paid: payload.get("paid").and_then(coerce_flag),
            notes: payload.contains_key("notes").then(|| {
                payload
                    .get("notes")
                    .filter(|value| !value.is_null())
                    .and_then(coerce_text)
            }),
            languages: payload
                .get("languages")
                .filter(|value| value.as_array().is_some_and(|a| !a.is_empty()))
                .and_then(coerce_languages),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The partial document pushed to the search index for this change.
    pub fn index_object(&self, id: i32) -> Value {
        let mut object = Map::new();
        object.insert("objectID".to_string(), Value::from(id));
        if let Some(name) = &self.name {
            object.insert("name".to_string(), Value::from(name.clone()));
        }
        if let Some(url) = &self.url {
            object.insert("url".to_string(), Value::from(url.clone()));
        }
        if let Some(category) = &self.category {
            object.insert("category".to_string(), Value::from(category.clone()));
        }
        if let Some(paid) = self.paid {
            object.insert("paid".to_string(), Value::from(paid));
        }
        if let Some(notes) = &self.notes {
            object.insert("notes".to_string(), Value::from(notes.clone()));
        }
        if let Some(languages) = &self.languages {
            object.insert("languages".to_string(), Value::from(languages.clone()));
        }
        Value::Object(object)
    }
}

/// Persistence operations the dual-write coordinator drives. The production
/// implementation is [`PgResourceStore`]; tests substitute an in-memory one
/// to exercise the failure protocol without a database.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Inserts a validated batch atomically and returns the stored views.
    async fn insert_batch(&self, items: &[Value]) -> Result<Vec<ResourceView>, ApiError>;

    /// Compensating delete after a failed index push.
    async fn delete_batch(&self, ids: &[i32]) -> Result<(), ApiError>;

    async fn fetch(&self, id: i32) -> Result<Option<ResourceView>, ApiError>;

    /// Applies a change set and returns the fresh view.
    async fn apply_update(&self, id: i32, change: &ChangeSet) -> Result<ResourceView, ApiError>;
}

pub struct PgResourceStore {
    pool: PgPool,
}

impl PgResourceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceStore for PgResourceStore {
    async fn insert_batch(&self, items: &[Value]) -> Result<Vec<ResourceView>, ApiError> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            let payload = item
                .as_object()
                .ok_or_else(|| ApiError::Server("validated item was not an object".to_string()))?;
            ids.push(insert_resource(&mut tx, payload).await?);
        }
        tx.commit().await?;

        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(view) = fetch_view(&self.pool, id).await? {
                views.push(view);
            }
        }
        Ok(views)
    }

    async fn delete_batch(&self, ids: &[i32]) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;
        // Join rows go first.
        sqlx::query("DELETE FROM language_identifier WHERE resource_id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM vote_information WHERE resource_id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM resource WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn fetch(&self, id: i32) -> Result<Option<ResourceView>, ApiError> {
        fetch_view(&self.pool, id).await
    }

    async fn apply_update(&self, id: i32, change: &ChangeSet) -> Result<ResourceView, ApiError> {
        let mut tx = self.pool.begin().await?;

        let mut update = QueryBuilder::new("UPDATE resource SET last_updated = NOW()");
        if let Some(name) = &change.name {
            update.push(", name = ");
            update.push_bind(name.clone());
        }
        if let Some(url) = &change.url {
            update.push(", url = ");
            update.push_bind(url.clone());
        }
        if let Some(paid) = change.paid {
            update.push(", paid = ");
            update.push_bind(paid);
        }
        if let Some(notes) = &change.notes {
            update.push(", notes = ");
            update.push_bind(notes.clone());
        }
        if let Some(category) = &change.category {
            let category_id = category_id(&mut tx, category).await?;
            update.push(", category_id = ");
            update.push_bind(category_id);
        }
        update.push(" WHERE id = ");
        update.push_bind(id);
        update.build().execute(&mut *tx).await?;

        if let Some(languages) = &change.languages {
            let ids = language_ids(&mut tx, languages).await?;
            replace_languages(&mut tx, id, &ids).await?;
        }
        tx.commit().await?;

        fetch_view(&self.pool, id).await?.ok_or(ApiError::NotFound)
    }
}

pub(crate) async fn category_id(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<i32, sqlx::Error> {
    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM category WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;
    match existing {
        Some(id) => Ok(id),
        None => {
            sqlx::query_scalar("INSERT INTO category (name) VALUES ($1) RETURNING id")
                .bind(name)
                .fetch_one(&mut **tx)
                .await
        }
    }
}

pub(crate) async fn language_ids(
    tx: &mut Transaction<'_, Postgres>,
    names: &[String],
) -> Result<Vec<i32>, sqlx::Error> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM language WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut **tx)
            .await?;
        let id = match existing {
            Some(id) => id,
            None => {
                sqlx::query_scalar("INSERT INTO language (name) VALUES ($1) RETURNING id")
                    .bind(name)
                    .fetch_one(&mut **tx)
                    .await?
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

pub(crate) async fn replace_languages(
    tx: &mut Transaction<'_, Postgres>,
    resource_id: i32,
    language_ids: &[i32],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM language_identifier WHERE resource_id = $1")
        .bind(resource_id)
        .execute(&mut **tx)
        .await?;
    for language_id in language_ids {
        sqlx::query(
            "INSERT INTO language_identifier (resource_id, language_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(resource_id)
        .bind(language_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Creates a batch of already-validated resources atomically, then pushes
/// the new documents to the search index. If the index push fails under the
/// strict policy, the rows are removed again so the two stores stay
/// consistent.
pub async fn create_resources(
    store: &dyn ResourceStore,
    search: &dyn SearchIndex,
    policy: SearchFailurePolicy,
    items: &[Value],
) -> Result<Vec<ResourceView>, ApiError> {
    let views = store.insert_batch(items).await?;

    let documents: Vec<Value> = views.iter().map(ResourceView::to_index_object).collect();
    if let Err(err) = search.save_objects(&documents).await {
        match policy {
            SearchFailurePolicy::Strict => {
                let ids: Vec<i32> = views.iter().map(|view| view.id).collect();
                store.delete_batch(&ids).await?;
                return Err(search_failure(err, "Algolia failed to index resources"));
            }
            SearchFailurePolicy::LogAndProceed => {
                tracing::warn!("search indexing failed, keeping rows: {}", err);
            }
        }
    }

    Ok(views)
}

async fn insert_resource(
    tx: &mut Transaction<'_, Postgres>,
    payload: &Map<String, Value>,
) -> Result<i32, ApiError> {
    let name = payload
        .get("name")
        .and_then(coerce_text)
        .ok_or_else(|| ApiError::Server("validated payload missing name".to_string()))?;
    let url = payload
        .get("url")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Server("validated payload missing url".to_string()))?;
    let category = payload
        .get("category")
        .and_then(coerce_text)
        .ok_or_else(|| ApiError::Server("validated payload missing category".to_string()))?;
    let paid = payload
        .get("paid")
        .and_then(coerce_flag)
        .ok_or_else(|| ApiError::Server("validated payload missing paid".to_string()))?;
    let notes = payload.get("notes").and_then(coerce_text);
    let languages = payload
        .get("languages")
        .and_then(coerce_languages)
        .unwrap_or_default();

    let category_id = category_id(tx, &category).await?;
    let resource_id: i32 = sqlx::query_scalar(
        "INSERT INTO resource (name, url, category_id, paid, notes) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&name)
    .bind(url)
    .bind(category_id)
    .bind(paid)
    .bind(&notes)
    .fetch_one(&mut **tx)
    .await?;

    let ids = language_ids(tx, &languages).await?;
    replace_languages(tx, resource_id, &ids).await?;
    Ok(resource_id)
}

fn search_failure(err: SearchError, message: &str) -> ApiError {
    tracing::error!("{message}: {err}");
    ApiError::SearchFailed(message.to_string())
}

/// Applies a validated partial update. The index is updated before the
/// database write; under the strict policy an index failure blocks the
/// whole update so a change is never visible in one store only.
pub async fn update_resource(
    store: &dyn ResourceStore,
    search: &dyn SearchIndex,
    policy: SearchFailurePolicy,
    id: i32,
    payload: &Map<String, Value>,
) -> Result<ResourceView, ApiError> {
    let current = store.fetch(id).await?.ok_or(ApiError::NotFound)?;
    tracing::info!(resource = id, old = %serde_json::to_value(&current).unwrap_or_default(), "updating resource");

    let change = ChangeSet::from_payload(payload);
    if !change.is_empty() {
        if let Err(err) = search.partial_update_object(&change.index_object(id)).await {
            match policy {
                SearchFailurePolicy::Strict => {
                    return Err(search_failure(err, "Algolia failed to update index"));
                }
                SearchFailurePolicy::LogAndProceed => {
                    tracing::warn!("search update failed, applying database change anyway: {}", err);
                }
            }
        }
    }

    store.apply_update(id, &change).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryCatalog, RecordingIndex};
    use serde_json::json;

    #[test]
    fn updated_after_accepts_dates_and_timestamps() {
        assert!(parse_timestamp("2026-01-15").is_some());
        assert!(parse_timestamp("2026-01-15 08:30:00").is_some());
        assert!(parse_timestamp("2026-01-15T08:30:00Z").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn bad_updated_after_is_a_422() {
        let query = QueryMap::from_raw(Some("updated_after=whenever"));
        let err = ResourceFilters::from_query(&query).unwrap_err();
        assert_eq!(err.code(), "unprocessable-entity");
        assert!(err.message().contains("updated_after"));
    }

    #[test]
    fn filters_pick_up_repeated_language_params() {
        let query = QueryMap::from_raw(Some("languages=python&languages=rust&paid=TRUE"));
        let filters = ResourceFilters::from_query(&query).unwrap();
        assert_eq!(filters.languages, vec!["python", "rust"]);
        assert_eq!(filters.paid, Some(true));
    }

    #[test]
    fn change_set_ignores_empty_strings_but_honors_notes_null() {
        let payload = json!({
            "name": "",
            "url": "",
            "category": "Books",
            "paid": "true",
            "notes": null,
        })
        .as_object()
        .unwrap()
        .clone();
        let change = ChangeSet::from_payload(&payload);
        assert_eq!(change.name, None);
        assert_eq!(change.url, None);
        assert_eq!(change.category, Some("Books".to_string()));
        assert_eq!(change.paid, Some(true));
        assert_eq!(change.notes, Some(None));
        assert_eq!(change.languages, None);
    }

    #[test]
    fn change_set_index_object_carries_only_touched_fields() {
        let payload = json!({ "name": "Renamed", "paid": false })
            .as_object()
            .unwrap()
            .clone();
        let object = ChangeSet::from_payload(&payload).index_object(9);
        assert_eq!(object["objectID"], json!(9));
        assert_eq!(object["name"], json!("Renamed"));
        assert_eq!(object["paid"], json!(false));
        assert!(object.get("url").is_none());
        assert!(object.get("category").is_none());
    }

    #[test]
    fn empty_payload_is_an_empty_change_set() {
        let payload = json!({ "unknown": 1 }).as_object().unwrap().clone();
        assert!(ChangeSet::from_payload(&payload).is_empty());
    }

    fn batch() -> Vec<Value> {
        vec![
            json!({ "name": "A", "url": "https://a.test", "category": "Books", "paid": false }),
            json!({ "name": "B", "url": "https://b.test", "category": "Books", "paid": true }),
        ]
    }

    #[tokio::test]
    async fn successful_create_lands_in_both_stores() {
        let store = MemoryCatalog::default();
        let index = RecordingIndex::default();

        let views = create_resources(&store, &index, SearchFailurePolicy::Strict, &batch())
            .await
            .unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(store.rows().len(), 2);

        let saved = index.saved.lock().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0]["objectID"], views[0].id);
    }

    #[tokio::test]
    async fn strict_create_rolls_back_rows_when_indexing_fails() {
        let store = MemoryCatalog::default();
        let index = RecordingIndex::failing();

        let err = create_resources(&store, &index, SearchFailurePolicy::Strict, &batch())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "algolia-failed");
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn lenient_create_keeps_rows_when_indexing_fails() {
        let store = MemoryCatalog::default();
        let index = RecordingIndex::failing();

        let views = create_resources(&store, &index, SearchFailurePolicy::LogAndProceed, &batch())
            .await
            .unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(store.rows().len(), 2);
    }

    #[tokio::test]
    async fn strict_update_is_blocked_when_indexing_fails() {
        let store = MemoryCatalog::default();
        let seeded = create_resources(
            &store,
            &RecordingIndex::default(),
            SearchFailurePolicy::Strict,
            &batch(),
        )
        .await
        .unwrap();
        let id = seeded[0].id;

        let payload = json!({ "name": "Renamed" }).as_object().unwrap().clone();
        let err = update_resource(
            &store,
            &RecordingIndex::failing(),
            SearchFailurePolicy::Strict,
            id,
            &payload,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "algolia-failed");

        let row = store.fetch(id).await.unwrap().unwrap();
        assert_eq!(row.name, "A");
    }

    #[tokio::test]
    async fn lenient_update_applies_despite_index_failure() {
        let store = MemoryCatalog::default();
        let seeded = create_resources(
            &store,
            &RecordingIndex::default(),
            SearchFailurePolicy::Strict,
            &batch(),
        )
        .await
        .unwrap();
        let id = seeded[0].id;

        let payload = json!({ "name": "Renamed" }).as_object().unwrap().clone();
        let view = update_resource(
            &store,
            &RecordingIndex::failing(),
            SearchFailurePolicy::LogAndProceed,
            id,
            &payload,
        )
        .await
        .unwrap();
        assert_eq!(view.name, "Renamed");
    }

    #[tokio::test]
    async fn update_pushes_partial_document_before_the_write() {
        let store = MemoryCatalog::default();
        let index = RecordingIndex::default();
        let seeded = create_resources(&store, &index, SearchFailurePolicy::Strict, &batch())
            .await
            .unwrap();
        let id = seeded[0].id;

        let payload = json!({ "paid": "true", "notes": "now paid" })
            .as_object()
            .unwrap()
            .clone();
        let view = update_resource(&store, &index, SearchFailurePolicy::Strict, id, &payload)
            .await
            .unwrap();
        assert!(view.paid);
        assert_eq!(view.notes.as_deref(), Some("now paid"));

        let partials = index.partials.lock().unwrap();
        assert_eq!(partials.len(), 1);
        assert_eq!(partials[0]["objectID"], json!(id));
        assert_eq!(partials[0]["paid"], json!(true));
        assert!(partials[0].get("name").is_none());
    }

    #[tokio::test]
    async fn updating_a_missing_resource_is_a_404() {
        let store = MemoryCatalog::default();
        let payload = json!({ "name": "x" }).as_object().unwrap().clone();
        let err = update_resource(
            &store,
            &RecordingIndex::default(),
            SearchFailurePolicy::Strict,
            99,
            &payload,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "not-found");
    }
}
