use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::keys::{KeyStore, PgKeyStore};
use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::db;
use crate::membership::{HttpMembershipVerifier, MembershipVerifier};
use crate::middleware::rate_limit::RateLimiter;
use crate::search::algolia::AlgoliaIndex;
use crate::search::SearchIndex;

/// Everything the handlers need, injected once at startup. Collaborators sit
/// behind trait objects so tests can substitute in-memory doubles.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub search: Arc<dyn SearchIndex>,
    pub membership: Arc<dyn MembershipVerifier>,
    pub keys: Arc<dyn KeyStore>,
    pub verifier: Arc<TokenVerifier>,
    pub limiter: Arc<RateLimiter>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect_lazy(&config.database)?;
        Self::with_pool(config, pool)
    }

    pub fn with_pool(config: AppConfig, pool: PgPool) -> anyhow::Result<Self> {
        let search = Arc::new(AlgoliaIndex::new(&config.search)?);
        let membership = Arc::new(HttpMembershipVerifier::new(
            config.auth.membership_url.clone(),
        )?);
        let keys = Arc::new(PgKeyStore::new(pool.clone()));
        let verifier = Arc::new(TokenVerifier::new(&config.auth)?);
        let limiter = Arc::new(RateLimiter::from_config(&config.api));

        Ok(Self {
            pool,
            search,
            membership,
            keys,
            verifier,
            limiter,
            config: Arc::new(config),
        })
    }
}
