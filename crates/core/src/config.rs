//! Gateway configuration.
//!
//! Built once at startup and handed to each component's constructor.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/codex.yaml";
pub const DEFAULT_DB_PATH: &str = "data/codex.db";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_tools_config")]
    pub tools_config: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Directory exported to workers through their runtime's search-path variable.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Worker runtimes keyed by file extension.
    #[serde(default = "default_runtimes")]
    pub runtimes: BTreeMap<String, RuntimeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    #[serde(default = "default_client_name")]
    pub client_name: String,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default = "default_terminate_grace_secs")]
    pub terminate_grace_secs: u64,
    /// Unbounded when absent.
    #[serde(default)]
    pub handshake_timeout_secs: Option<u64>,
}

/// How to launch workers of one file type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSpec {
    pub program: String,
    #[serde(default = "default_probe_args")]
    pub probe_args: Vec<String>,
    #[serde(default)]
    pub search_path_var: Option<String>,
}

impl RuntimeSpec {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            probe_args: default_probe_args(),
            search_path_var: None,
        }
    }

    pub fn with_probe_args(mut self, args: &[&str]) -> Self {
        self.probe_args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_search_path_var(mut self, var: &str) -> Self {
        self.search_path_var = Some(var.to_string());
        self
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

fn default_tools_config() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_protocol_version() -> String {
    PROTOCOL_VERSION.to_string()
}

fn default_client_name() -> String {
    "codex-server".to_string()
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_terminate_grace_secs() -> u64 {
    5
}

fn default_probe_args() -> Vec<String> {
    vec!["--version".to_string()]
}

pub fn default_runtimes() -> BTreeMap<String, RuntimeSpec> {
    let python = RuntimeSpec::new("python3").with_search_path_var("PYTHONPATH");
    let node = RuntimeSpec::new("node").with_search_path_var("NODE_PATH");
    let ts_node = RuntimeSpec::new("ts-node").with_search_path_var("NODE_PATH");

    let mut runtimes = BTreeMap::new();
    runtimes.insert("py".to_string(), python);
    runtimes.insert("js".to_string(), node.clone());
    runtimes.insert("jsx".to_string(), node);
    runtimes.insert("ts".to_string(), ts_node.clone());
    runtimes.insert("tsx".to_string(), ts_node);
    runtimes
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl SearchConfig {
    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs as i64)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            protocol_version: default_protocol_version(),
            client_name: default_client_name(),
            settle_delay_ms: default_settle_delay_ms(),
            call_timeout_secs: default_call_timeout_secs(),
            terminate_grace_secs: default_terminate_grace_secs(),
            handshake_timeout_secs: None,
        }
    }
}

impl BridgeConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn terminate_grace(&self) -> Duration {
        Duration::from_secs(self.terminate_grace_secs)
    }

    pub fn handshake_timeout(&self) -> Option<Duration> {
        self.handshake_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            tools_config: default_tools_config(),
            log_dir: default_log_dir(),
            working_dir: None,
            search: SearchConfig::default(),
            bridge: BridgeConfig::default(),
            runtimes: default_runtimes(),
        }
    }
}

impl GatewayConfig {
    /// Load a gateway config from a YAML file. Missing fields fall back to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(&content)?)
    }

    /// Working directory handed to workers, falling back to the process cwd.
    pub fn resolved_working_dir(&self) -> PathBuf {
        self.working_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
