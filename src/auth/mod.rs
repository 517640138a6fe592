pub mod keys;

use axum::http::{HeaderMap, Method};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Claims required of a bearer token: the member's email and an expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub exp: u64,
}

/// Verifies bearer tokens. RS256 against the configured public key in
/// production; HS256 with a shared secret when no key is provisioned.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> anyhow::Result<Self> {
        let (decoding_key, algorithm) = match &config.jwt_public_key {
            Some(pem) => (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256),
            None => (
                DecodingKey::from_secret(config.jwt_secret.as_bytes()),
                Algorithm::HS256,
            ),
        };
        Ok(Self {
            decoding_key,
            algorithm,
        })
    }

    /// Decodes and validates a token, including the expiry claim.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["exp"]);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Audit trail for authenticated writes: who did what to which path.
/// Creations and updates land in separate targets so they can be routed
/// independently by the subscriber.
pub fn log_request(method: &Method, path: &str, email: &str, body: &serde_json::Value) {
    if method == Method::POST {
        tracing::info!(
            target: "audit::create",
            email, path, payload = %body,
            "resource created"
        );
    } else {
        tracing::info!(
            target: "audit::update",
            email, path, payload = %body,
            "resource modified"
        );
    }
}
