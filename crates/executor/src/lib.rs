pub mod bridge;
pub mod jsonrpc;
pub mod runtime;
pub mod worker;

pub use bridge::ProtocolBridge;
pub use runtime::RuntimeAllowList;
pub use worker::{CleanupError, Worker};
