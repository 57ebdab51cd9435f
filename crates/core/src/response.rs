use crate::error::{ErrorKind, GatewayError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success/failure envelope returned across the upward contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub timestamp: DateTime<Utc>,
}

impl<T> GatewayResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            error_kind: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: &GatewayError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            timestamp: Utc::now(),
        }
    }

    pub fn from_result(result: Result<T, GatewayError>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::failure(&e),
        }
    }
}
