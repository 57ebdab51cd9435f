//! Newline-delimited JSON-RPC messages exchanged with workers.

use codex_core::{BridgeConfig, GatewayError};
use serde::Serialize;
use serde_json::{json, Value};

pub const JSONRPC_VERSION: &str = "2.0";
pub const INITIALIZE_ID: u64 = 1;
pub const CALL_ID: u64 = 2;

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Final reply shape of a response line.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Result(Value),
    Error(Value),
    Malformed(Value),
}

pub fn initialize_request(config: &BridgeConfig) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION,
        id: INITIALIZE_ID,
        method: "initialize",
        params: json!({
            "protocolVersion": config.protocol_version,
            "clientInfo": {
                "name": config.client_name,
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {
                "tools": { "listChanged": false }
            }
        }),
    }
}

pub fn initialized_notification() -> JsonRpcNotification {
    JsonRpcNotification {
        jsonrpc: JSONRPC_VERSION,
        method: "notifications/initialized",
        params: None,
    }
}

pub fn tools_call_request(method: &str, arguments: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION,
        id: CALL_ID,
        method: "tools/call",
        params: json!({
            "name": method,
            "arguments": arguments,
        }),
    }
}

/// Parse one line into a JSON value; anything else aborts the call.
pub fn parse_line(line: &[u8]) -> Result<Value, GatewayError> {
    serde_json::from_slice(line).map_err(|e| {
        GatewayError::ProtocolViolation(format!(
            "unparseable line {:?}: {}",
            String::from_utf8_lossy(line),
            e
        ))
    })
}

/// `error` wins over `result`; a null `error` counts as absent.
pub fn classify(response: Value) -> Reply {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        return Reply::Error(error.clone());
    }
    match response.get("result") {
        Some(result) => Reply::Result(result.clone()),
        None => Reply::Malformed(response),
    }
}
