use crate::cli::{parse_arguments, Cli, Command};
use anyhow::Result;
use codex_core::{GatewayConfig, GatewayError, GatewayResponse};
use codex_gateway::GatewayOrchestrator;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

/// Run one CLI command. Returns whether the printed envelope reported success.
pub async fn run(cli: &Cli, config: &GatewayConfig) -> Result<bool> {
    let gateway = GatewayOrchestrator::open(config)?;

    if !cli.skip_load && !matches!(cli.command, Command::Reload) {
        if config.tools_config.exists() {
            gateway.reload_file(&config.tools_config).await?;
        } else {
            warn!(
                "Tool manifest {} not found, using persisted registry",
                config.tools_config.display()
            );
        }
    }

    match &cli.command {
        Command::Search { query } => Ok(print(&gateway.search_tools(query).await)),
        Command::Call { tool_id, method, args } => {
            let arguments = match parse_arguments(args) {
                Ok(arguments) => arguments,
                Err(e) => {
                    let err = GatewayError::Config(e.to_string());
                    return Ok(print(&GatewayResponse::<()>::failure(&err)));
                }
            };
            Ok(print(&gateway.execute_tool(tool_id, method, arguments).await))
        }
        Command::Reload => {
            let count = gateway.reload_file(&config.tools_config).await?;
            info!("Reloaded {} tools from {}", count, config.tools_config.display());
            Ok(print(&GatewayResponse::ok(json!({ "tools": count }))))
        }
        Command::List => Ok(print(&gateway.list_tools().await)),
        Command::History { limit } => Ok(print(&gateway.recent_executions(*limit).await)),
    }
}

fn print<T: Serialize>(response: &GatewayResponse<T>) -> bool {
    match serde_json::to_string_pretty(response) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to render response: {}", e),
    }
    response.success
}
