pub mod firebase;

use async_trait::async_trait;

/// Resolves a bearer credential to the verified email of its holder.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> anyhow::Result<String>;
}
