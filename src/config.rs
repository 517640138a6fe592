use serde::{Deserialize, Serialize};
use std::env;

use crate::api::pagination::PaginatorConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    /// Upper bound on the number of resources accepted in one POST body.
    pub max_batch_size: usize,
    /// Reject unknown X-API-Version values instead of falling back to latest.
    pub strict_versioning: bool,
}

/// How a search-index failure during a write is handled.
///
/// `Strict` keeps the relational store and the index consistent by blocking
/// (update) or compensating (create). `LogAndProceed` favors availability and
/// is the development default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchFailurePolicy {
    Strict,
    LogAndProceed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub app_id: String,
    pub api_key: String,
    pub index_name: String,
    /// Overrides the provider host, mainly for local stand-ins.
    pub base_url: Option<String>,
    pub failure_policy: SearchFailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// PEM-encoded RSA public key for verifying bearer tokens (RS256).
    pub jwt_public_key: Option<String>,
    /// HS256 fallback secret used when no public key is configured.
    pub jwt_secret: String,
    /// Membership service endpoint consulted when issuing API keys.
    pub membership_url: String,
    /// Enhanced vote mode: track per-key vote direction for idempotent voting.
    pub track_votes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub resources: PaginatorConfig,
    pub languages: PaginatorConfig,
    pub categories: PaginatorConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs =
                v.parse().unwrap_or(self.api.rate_limit_window_secs);
        }
        if let Ok(v) = env::var("API_MAX_BATCH_SIZE") {
            self.api.max_batch_size = v.parse().unwrap_or(self.api.max_batch_size);
        }
        if let Ok(v) = env::var("API_STRICT_VERSIONING") {
            self.api.strict_versioning = v.parse().unwrap_or(self.api.strict_versioning);
        }

        if let Ok(v) = env::var("ALGOLIA_APP_ID") {
            self.search.app_id = v;
        }
        if let Ok(v) = env::var("ALGOLIA_API_KEY") {
            self.search.api_key = v;
        }
        if let Ok(v) = env::var("INDEX_NAME") {
            self.search.index_name = v;
        }
        if let Ok(v) = env::var("SEARCH_BASE_URL") {
            self.search.base_url = Some(v);
        }
        if let Ok(v) = env::var("SEARCH_FAILURE_POLICY") {
            self.search.failure_policy = match v.to_lowercase().as_str() {
                "strict" => SearchFailurePolicy::Strict,
                "log-and-proceed" | "log_and_proceed" => SearchFailurePolicy::LogAndProceed,
                _ => self.search.failure_policy,
            };
        }

        if let Ok(v) = env::var("JWT_PUBLIC_KEY") {
            self.auth.jwt_public_key = Some(v);
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("MEMBERSHIP_URL") {
            self.auth.membership_url = v;
        }
        if let Ok(v) = env::var("TRACK_VOTES") {
            self.auth.track_votes = v.parse().unwrap_or(self.auth.track_votes);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "postgres://localhost/resources_dev".to_string(),
                max_connections: 10,
            },
            api: ApiConfig {
                enable_rate_limiting: false,
                rate_limit_requests: 1000,
                rate_limit_window_secs: 3600,
                max_batch_size: 200,
                strict_versioning: false,
            },
            search: SearchConfig {
                app_id: String::new(),
                api_key: String::new(),
                index_name: "resources_dev".to_string(),
                base_url: None,
                failure_policy: SearchFailurePolicy::LogAndProceed,
            },
            auth: AuthConfig {
                jwt_public_key: None,
                jwt_secret: "dev-secret".to_string(),
                membership_url: "https://api.operationcode.org/auth/login/".to_string(),
                track_votes: false,
            },
            pagination: PaginationConfig {
                resources: PaginatorConfig::default(),
                languages: PaginatorConfig::default(),
                categories: PaginatorConfig::default(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 50,
                rate_limit_window_secs: 3600,
                max_batch_size: 200,
                strict_versioning: false,
            },
            search: SearchConfig {
                app_id: String::new(),
                api_key: String::new(),
                index_name: "resources".to_string(),
                base_url: None,
                failure_policy: SearchFailurePolicy::Strict,
            },
            auth: AuthConfig {
                jwt_public_key: None,
                jwt_secret: String::new(),
                membership_url: "https://api.operationcode.org/auth/login/".to_string(),
                track_votes: false,
            },
            pagination: PaginationConfig {
                resources: PaginatorConfig::default(),
                languages: PaginatorConfig::default(),
                categories: PaginatorConfig::default(),
            },
        }
    }
}
