use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::key::Key;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("no key matched the given identifier")]
    NotFound,
    /// The key is already in the requested denied/active state.
    #[error("key is already in the requested state")]
    AlreadyInState,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for API keys. Tests swap in an in-memory store.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Looks up a non-denied key by its token.
    async fn find_active(&self, apikey: &str) -> Result<Option<Key>, KeyError>;

    /// Looks up a key by its token regardless of denied state.
    async fn find(&self, apikey: &str) -> Result<Option<Key>, KeyError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Key>, KeyError>;

    /// Issues a brand-new key for the email.
    async fn issue(&self, email: &str) -> Result<Key, KeyError>;

    /// Replaces the key's token in place, keeping id and email stable.
    async fn rotate(&self, key: &Key) -> Result<Key, KeyError>;

    /// Flips the denied flag. `identifier` may be a token or an email.
    async fn set_denied(&self, identifier: &str, denied: bool) -> Result<Key, KeyError>;
}

/// Opaque token for a new or rotated key: a uuid4 without hyphens.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub struct PgKeyStore {
    pool: PgPool,
}

impl PgKeyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const KEY_COLUMNS: &str = "id, apikey, email, denied, created_at, last_updated";

#[async_trait]
impl KeyStore for PgKeyStore {
    async fn find_active(&self, apikey: &str) -> Result<Option<Key>, KeyError> {
        let key = sqlx::query_as::<_, Key>(&format!(
            "SELECT {KEY_COLUMNS} FROM api_key WHERE apikey = $1 AND denied = FALSE"
        ))
        .bind(apikey)
        .fetch_optional(&self.pool)
        .await?;
        Ok(key)
    }

    async fn find(&self, apikey: &str) -> Result<Option<Key>, KeyError> {
        let key = sqlx::query_as::<_, Key>(&format!(
            "SELECT {KEY_COLUMNS} FROM api_key WHERE apikey = $1"
        ))
        .bind(apikey)
        .fetch_optional(&self.pool)
        .await?;
        Ok(key)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Key>, KeyError> {
        let key = sqlx::query_as::<_, Key>(&format!(
            "SELECT {KEY_COLUMNS} FROM api_key WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(key)
    }

    async fn issue(&self, email: &str) -> Result<Key, KeyError> {
        let key = sqlx::query_as::<_, Key>(&format!(
            "INSERT INTO api_key (apikey, email) VALUES ($1, $2) RETURNING {KEY_COLUMNS}"
        ))
        .bind(generate_token())
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(key)
    }

    async fn rotate(&self, key: &Key) -> Result<Key, KeyError> {
        let rotated = sqlx::query_as::<_, Key>(&format!(
            "UPDATE api_key SET apikey = $1, last_updated = NOW() \
             WHERE id = $2 RETURNING {KEY_COLUMNS}"
        ))
        .bind(generate_token())
        .bind(key.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(rotated)
    }

    async fn set_denied(&self, identifier: &str, denied: bool) -> Result<Key, KeyError> {
        let existing = sqlx::query_as::<_, Key>(&format!(
            "SELECT {KEY_COLUMNS} FROM api_key WHERE apikey = $1 OR email = $1"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(KeyError::NotFound)?;

        if existing.denied == denied {
            return Err(KeyError::AlreadyInState);
        }

        let updated = sqlx::query_as::<_, Key>(&format!(
            "UPDATE api_key SET denied = $1, last_updated = NOW() \
             WHERE id = $2 RETURNING {KEY_COLUMNS}"
        ))
        .bind(denied)
        .bind(existing.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }
}
