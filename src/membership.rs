use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// External identity check consulted before an API key is issued or reissued.
#[async_trait]
pub trait MembershipVerifier: Send + Sync {
    /// Whether the credentials belong to a member in good standing.
    async fn verify_membership(&self, email: &str, password: &str) -> anyhow::Result<bool>;
}

/// Verifies against the membership service's login endpoint. A successful
/// login returns a session token; its presence is the whole signal.
pub struct HttpMembershipVerifier {
    client: Client,
    login_url: String,
}

impl HttpMembershipVerifier {
    pub fn new(login_url: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, login_url })
    }
}

#[async_trait]
impl MembershipVerifier for HttpMembershipVerifier {
    async fn verify_membership(&self, email: &str, password: &str) -> anyhow::Result<bool> {
        let response = self
            .client
            .post(&self.login_url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(false);
        }
        let body: Value = response.json().await?;
        Ok(body.get("token").is_some())
    }
}
