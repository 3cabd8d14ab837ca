//! Response bodies of the dashboard server

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Error message
    pub message: String,
    /// Additional details
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new("PAYLOAD_TOO_LARGE", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// The device store could not serve the request
    pub fn upstream(err: &DashboardError) -> Self {
        Self {
            details: Some(serde_json::json!({ "recoverable": err.is_recoverable() })),
            ..Self::new("UPSTREAM_ERROR", err.to_string())
        }
    }

    /// HTTP status the error is sent with
    pub fn status(&self) -> u16 {
        match self.code.as_str() {
            "NOT_FOUND" => 404,
            "BAD_REQUEST" => 400,
            "PAYLOAD_TOO_LARGE" => 413,
            "UPSTREAM_ERROR" => 502,
            _ => 500,
        }
    }
}

/// Body of `GET /health`
pub const HEALTH_OK: &str = "OK";
