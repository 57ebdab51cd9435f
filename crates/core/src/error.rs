use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification carried in failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    NotFound,
    UnsupportedMethod,
    UnsupportedWorkerType,
    WorkerNotFound,
    RuntimeUnavailable,
    Handshake,
    Timeout,
    ProtocolViolation,
    ToolFailed,
    Io,
    Internal,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Tool {0} not found. The tool may need to be installed.")]
    NotFound(String),

    #[error("Method {method} not supported by tool {tool_id}")]
    UnsupportedMethod { tool_id: String, method: String },

    #[error("Unsupported tool file type: {0}")]
    UnsupportedWorkerType(String),

    #[error("Tool file not found: {0}")]
    WorkerNotFound(String),

    #[error("Required executor '{0}' is not available")]
    RuntimeUnavailable(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Tool response timeout: {0}")]
    Timeout(String),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Tool error: {0}")]
    ToolFailed(serde_json::Value),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Config(_) => ErrorKind::Config,
            GatewayError::NotFound(_) => ErrorKind::NotFound,
            GatewayError::UnsupportedMethod { .. } => ErrorKind::UnsupportedMethod,
            GatewayError::UnsupportedWorkerType(_) => ErrorKind::UnsupportedWorkerType,
            GatewayError::WorkerNotFound(_) => ErrorKind::WorkerNotFound,
            GatewayError::RuntimeUnavailable(_) => ErrorKind::RuntimeUnavailable,
            GatewayError::Handshake(_) => ErrorKind::Handshake,
            GatewayError::Timeout(_) => ErrorKind::Timeout,
            GatewayError::ProtocolViolation(_) => ErrorKind::ProtocolViolation,
            GatewayError::ToolFailed(_) => ErrorKind::ToolFailed,
            GatewayError::Io(_) => ErrorKind::Io,
            GatewayError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_yaml::Error> for GatewayError {
    fn from(e: serde_yaml::Error) -> Self {
        GatewayError::Config(format!("Invalid YAML: {}", e))
    }
}
