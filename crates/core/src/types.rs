use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Derive the registry id for a tool name: lowercased, spaces become underscores.
pub fn tool_id_for(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Active,
    Inactive,
}

impl ToolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Active => "active",
            ToolStatus::Inactive => "inactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(ToolStatus::Active),
            "inactive" => Some(ToolStatus::Inactive),
            _ => None,
        }
    }
}

/// Registry record describing one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub executable_path: String,
    pub supported_methods: BTreeSet<String>,
    pub argument_schemas: BTreeMap<String, serde_json::Value>,
    pub status: ToolStatus,
    pub last_check: DateTime<Utc>,
}

impl ToolDescriptor {
    pub fn is_active(&self) -> bool {
        self.status == ToolStatus::Active
    }

    pub fn supports(&self, method: &str) -> bool {
        self.supported_methods.contains(method)
    }

    /// Case-insensitive substring match against name or description.
    /// `needle` must already be lowercased.
    pub fn matches_query(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSearchResult {
    pub query: String,
    pub matches: Vec<ToolDescriptor>,
    pub created_at: DateTime<Utc>,
}

impl CachedSearchResult {
    pub fn is_fresh(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now - self.created_at < window
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// One execution attempt as written to the execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub tool_id: String,
    pub method: String,
    pub arguments: serde_json::Value,
    pub outcome: Outcome,
    pub error_message: Option<String>,
    pub duration_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

/// Successful reply to a `tools/call` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    pub payload: serde_json::Value,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, description: &str) -> ToolDescriptor {
        ToolDescriptor {
            id: tool_id_for(name),
            name: name.to_string(),
            description: description.to_string(),
            executable_path: "tool.py".to_string(),
            supported_methods: BTreeSet::new(),
            argument_schemas: BTreeMap::new(),
            status: ToolStatus::Active,
            last_check: Utc::now(),
        }
    }

    #[test]
    fn test_tool_id_is_slug_of_name() {
        assert_eq!(tool_id_for("Test Tool"), "test_tool");
        assert_eq!(tool_id_for("Weather  API"), "weather__api");
        assert_eq!(tool_id_for("already_slug"), "already_slug");
    }

    #[test]
    fn test_matches_query_is_case_insensitive() {
        let tool = descriptor("Test Tool", "Returns SAMPLE data");
        assert!(tool.matches_query("test"));
        assert!(tool.matches_query("sample"));
        assert!(!tool.matches_query("zzz"));
    }

    #[test]
    fn test_freshness_window() {
        let now = Utc::now();
        let entry = CachedSearchResult {
            query: "q".to_string(),
            matches: vec![],
            created_at: now - chrono::Duration::minutes(59),
        };
        assert!(entry.is_fresh(now, chrono::Duration::hours(1)));
        assert!(!entry.is_fresh(now + chrono::Duration::minutes(2), chrono::Duration::hours(1)));
    }

    #[test]
    fn test_status_round_trip_strings() {
        assert_eq!(ToolStatus::parse(ToolStatus::Inactive.as_str()), Some(ToolStatus::Inactive));
        assert_eq!(ToolStatus::parse("unknown"), None);
    }
}
