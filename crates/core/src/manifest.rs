//! Declarative tool manifest loader.

use crate::error::GatewayError;
use crate::types::{tool_id_for, ToolDescriptor, ToolStatus};
use chrono::Utc;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    tools: Option<Vec<RawTool>>,
}

#[derive(Debug, Deserialize)]
struct RawTool {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(alias = "executable")]
    server: String,
    #[serde(default)]
    methods: Vec<String>,
    #[serde(default)]
    schemas: BTreeMap<String, serde_json::Value>,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A fully parsed and validated tool list, ready to replace the registry.
#[derive(Debug, Clone, Default)]
pub struct ToolManifest {
    pub tools: Vec<ToolDescriptor>,
}

impl ToolManifest {
    /// Parse a manifest document. Nothing is returned unless every entry is valid.
    pub fn parse(content: &str) -> Result<Self, GatewayError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: RawManifest = serde_yaml::from_str(content)?;
        let now = Utc::now();
        let mut seen = HashSet::new();
        let mut tools = Vec::new();

        for entry in raw.tools.unwrap_or_default() {
            if entry.name.trim().is_empty() {
                return Err(GatewayError::Config("Tool missing required field: name".to_string()));
            }
            if entry.server.trim().is_empty() {
                return Err(GatewayError::Config(format!(
                    "Tool {} missing required field: server",
                    entry.name
                )));
            }

            let id = tool_id_for(&entry.name);
            if !seen.insert(id.clone()) {
                return Err(GatewayError::Config(format!("Duplicate tool id: {}", id)));
            }

            tools.push(ToolDescriptor {
                id,
                name: entry.name,
                description: entry.description,
                executable_path: entry.server,
                supported_methods: entry.methods.into_iter().collect::<BTreeSet<_>>(),
                argument_schemas: entry.schemas,
                status: if entry.enabled { ToolStatus::Active } else { ToolStatus::Inactive },
                last_check: now,
            });
        }

        Ok(Self { tools })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
