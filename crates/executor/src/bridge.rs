use crate::jsonrpc::{self, Reply};
use crate::runtime::{self, RuntimeAllowList};
use crate::worker::Worker;
use chrono::Utc;
use codex_core::{BridgeConfig, CallResult, GatewayConfig, GatewayError, GatewayMetrics, ToolDescriptor};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Runs exactly one `tools/call` against a freshly spawned worker and always
/// tears the worker down afterwards. Workers are never reused.
pub struct ProtocolBridge {
    config: BridgeConfig,
    runtimes: RuntimeAllowList,
    working_dir: PathBuf,
    metrics: Option<Arc<GatewayMetrics>>,
}

impl ProtocolBridge {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            config: config.bridge.clone(),
            runtimes: RuntimeAllowList::new(config.runtimes.clone()),
            working_dir: config.resolved_working_dir(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub async fn call(
        &self,
        tool: &ToolDescriptor,
        method: &str,
        arguments: Value,
    ) -> Result<CallResult, GatewayError> {
        let runtime = self.runtimes.resolve(Path::new(&tool.executable_path))?;
        let script = runtime::prepare_worker_file(&tool.executable_path, &self.working_dir)?;
        runtime::probe(runtime).await?;

        info!(
            "Executing {}.{} with {} {}",
            tool.id,
            method,
            runtime.program,
            script.display()
        );

        let mut worker = Worker::spawn(runtime, &script, &self.working_dir)?;
        if let Some(metrics) = &self.metrics {
            metrics.inc_workers_spawned();
        }
        let pid = worker.pid();

        let outcome = self.converse(&mut worker, method, arguments).await;

        if let Err(e) = worker.shutdown(self.config.terminate_grace()).await {
            warn!("Error cleaning up worker {:?} for {}: {}", pid, tool.id, e);
        }

        outcome
    }

    async fn converse(
        &self,
        worker: &mut Worker,
        method: &str,
        arguments: Value,
    ) -> Result<CallResult, GatewayError> {
        self.handshake(worker).await?;

        worker.send(&jsonrpc::tools_call_request(method, arguments)).await?;

        let line = match timeout(self.config.call_timeout(), worker.read_line()).await {
            Err(_) => {
                return Err(GatewayError::Timeout(format!(
                    "no response within {:?}",
                    self.config.call_timeout()
                )))
            }
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => {
                return Err(GatewayError::Timeout(
                    "worker closed its output before responding".to_string(),
                ))
            }
            Ok(Err(e)) => return Err(GatewayError::Io(e)),
        };

        match jsonrpc::classify(jsonrpc::parse_line(&line)?) {
            Reply::Result(payload) => Ok(CallResult {
                payload,
                completed_at: Utc::now(),
            }),
            Reply::Error(error) => Err(GatewayError::ToolFailed(error)),
            Reply::Malformed(_) => Err(GatewayError::ProtocolViolation(
                "Invalid response format from tool".to_string(),
            )),
        }
    }

    async fn handshake(&self, worker: &mut Worker) -> Result<(), GatewayError> {
        worker
            .send(&jsonrpc::initialize_request(&self.config))
            .await
            .map_err(|e| GatewayError::Handshake(format!("could not send initialize: {}", e)))?;

        let read = match self.config.handshake_timeout() {
            Some(limit) => timeout(limit, worker.read_line()).await.map_err(|_| {
                GatewayError::Handshake(format!("no initialize response within {:?}", limit))
            })?,
            None => worker.read_line().await,
        };

        let line = read
            .map_err(|e| GatewayError::Handshake(e.to_string()))?
            .ok_or_else(|| GatewayError::Handshake("No initialization response received".to_string()))?;

        let response = jsonrpc::parse_line(&line)?;
        if !response.is_object() {
            return Err(GatewayError::Handshake(format!(
                "Initialization response is not an object: {}",
                response
            )));
        }
        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            return Err(GatewayError::Handshake(format!("Initialization failed: {}", error)));
        }
        debug!("Worker {:?} initialized", worker.pid());

        worker
            .send(&jsonrpc::initialized_notification())
            .await
            .map_err(|e| GatewayError::Handshake(format!("could not send initialized: {}", e)))?;

        sleep(self.config.settle_delay()).await;
        Ok(())
    }
}
