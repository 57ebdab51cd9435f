use anyhow::{Context, Result};
use codex_core::GatewayConfig;
use std::path::Path;

/// Create the directories the gateway writes into: the manifest's, the
/// database's and the log directory.
pub fn ensure_directories(config: &GatewayConfig) -> Result<()> {
    let parents = [config.tools_config.parent(), config.db_path.parent()];
    for dir in parents.into_iter().flatten().chain([config.log_dir.as_path()]) {
        create(dir)?;
    }
    Ok(())
}

fn create(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}
