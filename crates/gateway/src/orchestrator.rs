use crate::adapters::blocking;
use crate::bridge::ToolBridge;
use chrono::Utc;
use codex_core::{
    CallResult, ExecutionRecord, GatewayConfig, GatewayError, GatewayMetrics, GatewayResponse,
    MetricsSnapshot, Outcome, ToolDescriptor, ToolManifest,
};
use codex_executor::ProtocolBridge;
use codex_store::{ExecutionLog, SearchCache, Store, ToolRegistry};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Entry point for the upward contract: execute, search, reload.
#[derive(Clone)]
pub struct GatewayOrchestrator {
    registry: Arc<ToolRegistry>,
    cache: Arc<SearchCache>,
    log: Arc<ExecutionLog>,
    bridge: Arc<dyn ToolBridge>,
    metrics: Arc<GatewayMetrics>,
}

impl GatewayOrchestrator {
    /// Open the store named in `config` and wire up a process bridge.
    pub fn open(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let metrics = GatewayMetrics::new();
        let bridge = ProtocolBridge::new(config).with_metrics(metrics.clone());
        Self::with_bridge(config, Arc::new(bridge), metrics)
    }

    pub fn with_bridge(
        config: &GatewayConfig,
        bridge: Arc<dyn ToolBridge>,
        metrics: Arc<GatewayMetrics>,
    ) -> Result<Self, GatewayError> {
        let store = Store::open(&config.db_path)?;
        Ok(Self {
            registry: Arc::new(ToolRegistry::new(store.clone())),
            cache: Arc::new(SearchCache::new(store.clone(), config.search.freshness_window())),
            log: Arc::new(ExecutionLog::new(store)),
            bridge,
            metrics,
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    pub fn execution_log(&self) -> &ExecutionLog {
        &self.log
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Replace the registry with an already parsed manifest.
    pub async fn reload(&self, manifest: ToolManifest) -> Result<usize, GatewayError> {
        let registry = self.registry.clone();
        let count = blocking(move || registry.reload(&manifest)).await?;
        info!("Tool configurations reloaded: {} tools", count);
        Ok(count)
    }

    /// Parse `path` completely, then replace the registry. A bad file leaves
    /// the registry as it was.
    pub async fn reload_file<P: AsRef<Path>>(&self, path: P) -> Result<usize, GatewayError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let manifest = tokio::task::spawn_blocking(move || ToolManifest::load(&path))
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?
            .map_err(|e| {
                error!("Error reloading tools config: {}", e);
                e
            })?;
        self.reload(manifest).await
    }

    /// Validate, dispatch and log one call. The work runs on its own task, so
    /// dropping the returned future still lets the worker be torn down and
    /// the execution record be written.
    pub async fn execute_tool(&self, tool_id: &str, method: &str, arguments: Value) -> GatewayResponse<Value> {
        let this = self.clone();
        let tool_id = tool_id.to_string();
        let method = method.to_string();
        let task = tokio::spawn(async move { this.run_execution(&tool_id, &method, arguments).await });

        match task.await {
            Ok(response) => response,
            Err(e) => {
                error!("Execution task failed: {}", e);
                GatewayResponse::failure(&GatewayError::Internal(e.to_string()))
            }
        }
    }

    async fn run_execution(&self, tool_id: &str, method: &str, arguments: Value) -> GatewayResponse<Value> {
        let started = Instant::now();
        let outcome = self.dispatch(tool_id, method, arguments.clone()).await;
        let duration_seconds = started.elapsed().as_secs_f64();

        self.metrics.inc_tool_executions();
        if outcome.is_err() {
            self.metrics.inc_tool_failures();
        }

        let record = ExecutionRecord {
            tool_id: tool_id.to_string(),
            method: method.to_string(),
            arguments,
            outcome: if outcome.is_ok() { Outcome::Success } else { Outcome::Failure },
            error_message: outcome.as_ref().err().map(|e| e.to_string()),
            duration_seconds,
            timestamp: Utc::now(),
        };
        let log = self.log.clone();
        if let Err(e) = blocking(move || log.append(&record)).await {
            error!("Failed to record execution of {}.{}: {}", tool_id, method, e);
        }

        match outcome {
            Ok(result) => {
                info!("{}.{} succeeded in {:.3}s", tool_id, method, duration_seconds);
                let mut response = GatewayResponse::ok(result.payload);
                response.timestamp = result.completed_at;
                response
            }
            Err(e) => {
                warn!("{}.{} failed after {:.3}s: {}", tool_id, method, duration_seconds, e);
                GatewayResponse::failure(&e)
            }
        }
    }

    async fn dispatch(&self, tool_id: &str, method: &str, arguments: Value) -> Result<CallResult, GatewayError> {
        let registry = self.registry.clone();
        let id = tool_id.to_string();
        let tool = blocking(move || registry.lookup(&id)).await?;

        if !tool.supports(method) {
            return Err(GatewayError::UnsupportedMethod {
                tool_id: tool_id.to_string(),
                method: method.to_string(),
            });
        }

        self.bridge.call(&tool, method, arguments).await
    }

    /// Case-insensitive substring search over active tools, cache first.
    pub async fn search_tools(&self, query: &str) -> GatewayResponse<Vec<ToolDescriptor>> {
        let key = query.to_lowercase();
        let registry = self.registry.clone();
        let cache = self.cache.clone();

        let searched = blocking(move || {
            if let Some(hit) = cache.get(&key)? {
                return Ok((hit, true));
            }

            let matches: Vec<ToolDescriptor> = registry
                .list_active()?
                .into_iter()
                .filter(|tool| tool.matches_query(&key))
                .collect();

            if let Err(e) = cache.put(&key, &matches) {
                warn!("Failed to cache search {:?}: {}", key, e);
            }
            Ok((matches, false))
        })
        .await;

        match searched {
            Ok((matches, hit)) => {
                if hit {
                    self.metrics.inc_cache_hits();
                } else {
                    self.metrics.inc_cache_misses();
                }
                GatewayResponse::ok(matches)
            }
            Err(e) => {
                error!("Search for {:?} failed: {}", query, e);
                GatewayResponse::failure(&e)
            }
        }
    }

    pub async fn list_tools(&self) -> GatewayResponse<Vec<ToolDescriptor>> {
        let registry = self.registry.clone();
        GatewayResponse::from_result(blocking(move || registry.list_all()).await)
    }

    pub async fn recent_executions(&self, limit: usize) -> GatewayResponse<Vec<ExecutionRecord>> {
        let log = self.log.clone();
        GatewayResponse::from_result(blocking(move || log.recent(limit)).await)
    }
}
