use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codex_core::GatewayConfig;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "codex", version, about = "Tool discovery and execution gateway")]
pub struct Cli {
    /// Gateway config file (YAML). Defaults apply when omitted.
    #[arg(long, env = "CODEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database holding registry, cache and execution log.
    #[arg(long, env = "CODEX_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Tool manifest (YAML).
    #[arg(long, env = "CODEX_TOOLS_CONFIG")]
    pub tools_config: Option<PathBuf>,

    /// Use the persisted registry instead of loading the manifest at startup.
    #[arg(long)]
    pub skip_load: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find active tools whose name or description contains QUERY.
    Search { query: String },
    /// Execute METHOD on TOOL_ID in a fresh worker process.
    Call {
        tool_id: String,
        method: String,
        /// JSON object passed as the call arguments.
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Re-read the tool manifest and replace the registry.
    Reload,
    /// List every registered tool, inactive ones included.
    List,
    /// Show recent execution attempts.
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

impl Cli {
    /// Build the gateway config: file (if any), then flag/env overrides.
    pub fn gateway_config(&self) -> Result<GatewayConfig> {
        let mut config = match &self.config {
            Some(path) => GatewayConfig::load(path)
                .with_context(|| format!("Failed to load gateway config {}", path.display()))?,
            None => GatewayConfig::default(),
        };

        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.clone();
        }
        if let Some(tools_config) = &self.tools_config {
            config.tools_config = tools_config.clone();
        }

        Ok(config)
    }
}

pub fn parse_arguments(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("--args must be valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("--args must be a JSON object");
    }
    Ok(value)
}
