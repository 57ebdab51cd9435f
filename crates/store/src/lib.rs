//! SQLite persistence for the tool registry, search cache and execution log.

pub mod execution_log;
pub mod registry;
pub mod search_cache;
pub mod store;

pub use execution_log::ExecutionLog;
pub use registry::ToolRegistry;
pub use search_cache::SearchCache;
pub use store::{Store, StoreError};
