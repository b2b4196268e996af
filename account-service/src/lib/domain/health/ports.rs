use async_trait::async_trait;

/// Liveness probe for the backing store.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    /// Run a trivial round trip against the store.
    async fn ping(&self) -> anyhow::Result<()>;
}
