pub mod algolia;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The provider could not be reached at all (DNS, connect, timeout).
    #[error("search provider unreachable: {0}")]
    Unreachable(String),
    /// The provider answered with an error status.
    #[error("search provider error: {0}")]
    Provider(String),
}

/// A full-text query against the hosted index. Pages are 0-based on this
/// boundary; the HTTP layer owns the translation from client paging.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub term: String,
    pub page: u32,
    pub page_size: u32,
    pub filters: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub hits: Vec<Value>,
    pub total_hits: u64,
    pub total_pages: u32,
}

/// Seam to the hosted search provider. Production uses [`algolia::AlgoliaIndex`];
/// tests substitute an in-memory recorder.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, SearchError>;

    /// Adds or replaces whole documents, keyed by their `objectID` field.
    async fn save_objects(&self, objects: &[Value]) -> Result<(), SearchError>;

    /// Merges the given fields into the document named by `object_id`.
    async fn partial_update_object(&self, object: &Value) -> Result<(), SearchError>;
}

/// Builds the provider filter expression for the given facets. Category and
/// language values are quoted; embedded double quotes are stripped so a value
/// cannot break out of its own clause. Multiple languages are OR-joined.
pub fn build_filter_string(
    paid: Option<bool>,
    category: Option<&str>,
    languages: &[String],
) -> Option<String> {
    let mut clauses = Vec::new();

    if let Some(paid) = paid {
        clauses.push(format!("paid={}", if paid { 1 } else { 0 }));
    }
    if let Some(category) = category {
        clauses.push(format!("category:\"{}\"", sanitize(category)));
    }
    if !languages.is_empty() {
        let joined = languages
            .iter()
            .map(|lang| format!("languages:\"{}\"", sanitize(lang)))
            .collect::<Vec<_>>()
            .join(" OR ");
        clauses.push(format!("({joined})"));
    }

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" AND "))
    }
}

fn sanitize(value: &str) -> String {
    value.replace('"', "")
}
