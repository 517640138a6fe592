//! In-memory doubles for the service's collaborators, used by router and
//! handler tests. Compiled for tests only.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::auth::keys::{generate_token, KeyError, KeyStore};
use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::db;
use crate::membership::MembershipVerifier;
use crate::middleware::rate_limit::RateLimiter;
use crate::error::ApiError;
use crate::models::key::Key;
use crate::models::resource::ResourceView;
use crate::search::{SearchError, SearchIndex, SearchQuery, SearchResults};
use crate::services::resources::{ChangeSet, ResourceStore};
use crate::state::AppState;
use crate::validation::{coerce_flag, coerce_languages, coerce_text};

#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: Mutex<Vec<Key>>,
    next_id: Mutex<i32>,
}

impl InMemoryKeyStore {
    pub fn with_key(apikey: &str, email: &str, denied: bool) -> Self {
        let store = Self::default();
        store.insert(apikey, email, denied);
        store
    }

    pub fn insert(&self, apikey: &str, email: &str, denied: bool) {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        self.keys.lock().unwrap().push(Key {
            id: *next_id,
            apikey: apikey.to_string(),
            email: email.to_string(),
            denied,
            created_at: None,
            last_updated: None,
        });
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn find_active(&self, apikey: &str) -> Result<Option<Key>, KeyError> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|key| key.apikey == apikey && !key.denied)
            .cloned())
    }

    async fn find(&self, apikey: &str) -> Result<Option<Key>, KeyError> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|key| key.apikey == apikey)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Key>, KeyError> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|key| key.email == email)
            .cloned())
    }

    async fn issue(&self, email: &str) -> Result<Key, KeyError> {
        self.insert(&generate_token(), email, false);
        Ok(self
            .keys
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("just inserted"))
    }

    async fn rotate(&self, key: &Key) -> Result<Key, KeyError> {
        let mut keys = self.keys.lock().unwrap();
        let entry = keys
            .iter_mut()
            .find(|candidate| candidate.id == key.id)
            .ok_or(KeyError::NotFound)?;
        entry.apikey = generate_token();
        Ok(entry.clone())
    }

    async fn set_denied(&self, identifier: &str, denied: bool) -> Result<Key, KeyError> {
        let mut keys = self.keys.lock().unwrap();
        let entry = keys
            .iter_mut()
            .find(|key| key.apikey == identifier || key.email == identifier)
            .ok_or(KeyError::NotFound)?;
        if entry.denied == denied {
            return Err(KeyError::AlreadyInState);
        }
        entry.denied = denied;
        Ok(entry.clone())
    }
}

/// Membership verifier with a fixed answer.
pub struct StaticMembership(pub bool);

#[async_trait]
impl MembershipVerifier for StaticMembership {
    async fn verify_membership(&self, _email: &str, _password: &str) -> anyhow::Result<bool> {
        Ok(self.0)
    }
}

/// Search index that records writes and can be told to fail.
#[derive(Default)]
pub struct RecordingIndex {
    pub saved: Mutex<Vec<Value>>,
    pub partials: Mutex<Vec<Value>>,
    pub results: Mutex<SearchResults>,
    fail: AtomicBool,
}

impl RecordingIndex {
    pub fn failing() -> Self {
        let index = Self::default();
        index.fail.store(true, Ordering::SeqCst);
        index
    }

    fn check(&self) -> Result<(), SearchError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(SearchError::Unreachable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SearchIndex for RecordingIndex {
    async fn search(&self, _query: &SearchQuery) -> Result<SearchResults, SearchError> {
        self.check()?;
        Ok(self.results.lock().unwrap().clone())
    }

    async fn save_objects(&self, objects: &[Value]) -> Result<(), SearchError> {
        self.check()?;
        self.saved.lock().unwrap().extend_from_slice(objects);
        Ok(())
    }

    async fn partial_update_object(&self, object: &Value) -> Result<(), SearchError> {
        self.check()?;
        self.partials.lock().unwrap().push(object.clone());
        Ok(())
    }
}

/// In-memory [`ResourceStore`] for exercising the dual-write coordinator
/// without PostgreSQL.
#[derive(Default)]
pub struct MemoryCatalog {
    rows: Mutex<Vec<ResourceView>>,
    next_id: Mutex<i32>,
}

impl MemoryCatalog {
    pub fn rows(&self) -> Vec<ResourceView> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceStore for MemoryCatalog {
    async fn insert_batch(&self, items: &[Value]) -> Result<Vec<ResourceView>, ApiError> {
        let mut rows = self.rows.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            let payload = item
                .as_object()
                .ok_or_else(|| ApiError::Server("validated item was not an object".to_string()))?;
            *next_id += 1;
            let view = ResourceView {
                id: *next_id,
                name: payload.get("name").and_then(coerce_text).unwrap_or_default(),
                url: payload
                    .get("url")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                category: payload
                    .get("category")
                    .and_then(coerce_text)
                    .unwrap_or_default(),
                languages: payload
                    .get("languages")
                    .and_then(coerce_languages)
                    .unwrap_or_default(),
                paid: payload.get("paid").and_then(coerce_flag).unwrap_or(false),
                notes: payload.get("notes").and_then(coerce_text),
                upvotes: 0,
                downvotes: 0,
                times_clicked: 0,
                created_at: None,
                last_updated: None,
            };
            rows.push(view.clone());
            views.push(view);
        }
        Ok(views)
    }

    async fn delete_batch(&self, ids: &[i32]) -> Result<(), ApiError> {
        self.rows.lock().unwrap().retain(|row| !ids.contains(&row.id));
        Ok(())
    }

    async fn fetch(&self, id: i32) -> Result<Option<ResourceView>, ApiError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn apply_update(&self, id: i32, change: &ChangeSet) -> Result<ResourceView, ApiError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(ApiError::NotFound)?;
        if let Some(name) = &change.name {
            row.name = name.clone();
        }
        if let Some(url) = &change.url {
            row.url = url.clone();
        }
        if let Some(category) = &change.category {
            row.category = category.clone();
        }
        if let Some(paid) = change.paid {
            row.paid = paid;
        }
        if let Some(notes) = &change.notes {
            row.notes = notes.clone();
        }
        if let Some(languages) = &change.languages {
            row.languages = languages.clone();
        }
        Ok(row.clone())
    }
}

/// State with in-memory collaborators and a lazy pool that never connects
/// unless a test actually touches the database.
pub fn test_state(
    keys: Arc<dyn KeyStore>,
    search: Arc<dyn SearchIndex>,
    membership: Arc<dyn MembershipVerifier>,
    config: AppConfig,
) -> AppState {
    let pool = db::connect_lazy(&config.database).expect("lazy pool");
    let verifier = Arc::new(TokenVerifier::new(&config.auth).expect("verifier"));
    let limiter = Arc::new(RateLimiter::from_config(&config.api));
    AppState {
        pool,
        search,
        membership,
        keys,
        verifier,
        limiter,
        config: Arc::new(config),
    }
}
