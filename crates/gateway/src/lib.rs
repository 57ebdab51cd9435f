//! Tool execution gateway: registry validation, process-per-call dispatch,
//! cached search and execution logging behind one envelope-returning API.

pub mod adapters;
pub mod bridge;
pub mod orchestrator;

pub use bridge::ToolBridge;
pub use orchestrator::GatewayOrchestrator;
