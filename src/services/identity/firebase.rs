use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::IdentityVerifier;

const LOOKUP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:lookup";

/// Verifies Firebase ID tokens against the Identity Toolkit account lookup.
pub struct FirebaseIdentityVerifier {
    api_key: String,
    lookup_url: String,
    client: reqwest::Client,
}

impl FirebaseIdentityVerifier {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            lookup_url: LOOKUP_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseIdentityVerifier {
    async fn verify(&self, token: &str) -> anyhow::Result<String> {
        let resp = self
            .client
            .post(&self.lookup_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "idToken": token }))
            .send()
            .await
            .context("failed to call Firebase account lookup")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Firebase lookup response")?;

        if !status.is_success() {
            anyhow::bail!("Firebase rejected token ({}): {}", status, data["error"]["message"]);
        }

        data["users"][0]["email"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("token has no email claim"))
    }
}
