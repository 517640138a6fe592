use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{SearchError, SearchIndex, SearchQuery, SearchResults};
use crate::config::SearchConfig;

/// REST client for a hosted Algolia index.
pub struct AlgoliaIndex {
    client: Client,
    base_url: String,
    index_name: String,
    app_id: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    hits: Vec<Value>,
    #[serde(default, rename = "nbHits")]
    nb_hits: u64,
    #[serde(default, rename = "nbPages")]
    nb_pages: u32,
}

impl AlgoliaIndex {
    pub fn new(config: &SearchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}-dsn.algolia.net", config.app_id.to_lowercase()));
        Ok(Self {
            client,
            base_url,
            index_name: config.index_name.clone(),
            app_id: config.app_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/1/indexes/{}{}", self.base_url, self.index_name, suffix)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, SearchError> {
        let response = self
            .client
            .post(url)
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SearchError::Provider(format!("{status}: {detail}")));
        }
        response
            .json()
            .await
            .map_err(|err| SearchError::Provider(err.to_string()))
    }
}

fn classify(err: reqwest::Error) -> SearchError {
    if err.is_connect() || err.is_timeout() {
        SearchError::Unreachable(err.to_string())
    } else {
        SearchError::Provider(err.to_string())
    }
}

#[async_trait]
impl SearchIndex for AlgoliaIndex {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, SearchError> {
        let mut body = json!({
            "query": query.term,
            "page": query.page,
            "hitsPerPage": query.page_size,
        });
        if let Some(filters) = &query.filters {
            body["filters"] = Value::from(filters.clone());
        }

        let raw = self.post(&self.endpoint("/query"), &body).await?;
        let parsed: QueryResponse = serde_json::from_value(raw)
            .map_err(|err| SearchError::Provider(err.to_string()))?;
        Ok(SearchResults {
            hits: parsed.hits,
            total_hits: parsed.nb_hits,
            total_pages: parsed.nb_pages,
        })
    }

    async fn save_objects(&self, objects: &[Value]) -> Result<(), SearchError> {
        let requests: Vec<Value> = objects
            .iter()
            .map(|object| json!({ "action": "addObject", "body": object }))
            .collect();
        self.post(&self.endpoint("/batch"), &json!({ "requests": requests }))
            .await?;
        Ok(())
    }

    async fn partial_update_object(&self, object: &Value) -> Result<(), SearchError> {
        let object_id = object
            .get("objectID")
            .and_then(Value::as_i64)
            .ok_or_else(|| SearchError::Provider("partial update without objectID".to_string()))?;
        self.post(&self.endpoint(&format!("/{object_id}/partial")), object)
            .await?;
        Ok(())
    }
}
