use async_trait::async_trait;

/// Source of the bearer token attached to backend requests.
#[async_trait]
pub trait AccessTokenPort: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}
