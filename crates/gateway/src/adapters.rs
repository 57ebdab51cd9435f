use codex_core::GatewayError;
use codex_store::StoreError;

/// Run a synchronous store operation off the async executor.
pub async fn blocking<T, F>(op: F) -> Result<T, GatewayError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| GatewayError::Internal(e.to_string()))?
        .map_err(GatewayError::from)
}
