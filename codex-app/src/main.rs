use anyhow::Result;
use clap::Parser;
use codex_app::{bootstrap, commands, logging, Cli};
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.gateway_config()?;

    bootstrap::ensure_directories(&config)?;
    let _guard = logging::init(&config.log_dir)?;

    info!(
        "Gateway starting (db: {}, tools: {})",
        config.db_path.display(),
        config.tools_config.display()
    );

    let success = commands::run(&cli, &config).await?;
    Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
