use async_trait::async_trait;
use codex_core::{CallResult, GatewayError, ToolDescriptor};
use codex_executor::ProtocolBridge;
use serde_json::Value;

/// Executes one method call against a tool.
#[async_trait]
pub trait ToolBridge: Send + Sync {
    async fn call(
        &self,
        tool: &ToolDescriptor,
        method: &str,
        arguments: Value,
    ) -> Result<CallResult, GatewayError>;
}

#[async_trait]
impl ToolBridge for ProtocolBridge {
    async fn call(
        &self,
        tool: &ToolDescriptor,
        method: &str,
        arguments: Value,
    ) -> Result<CallResult, GatewayError> {
        ProtocolBridge::call(self, tool, method, arguments).await
    }
}
