pub mod config;
pub mod error;
pub mod manifest;
pub mod metrics;
pub mod response;
pub mod types;

pub use config::{BridgeConfig, GatewayConfig, RuntimeSpec, SearchConfig};
pub use error::{ErrorKind, GatewayError};
pub use manifest::ToolManifest;
pub use metrics::{GatewayMetrics, MetricsSnapshot};
pub use response::GatewayResponse;
pub use types::*;
