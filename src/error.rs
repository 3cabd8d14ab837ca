//! Error types for SmartClass
//!
//! This module defines all error types used throughout the dashboard,
//! covering the remote device store, the device model and the local
//! dashboard server.

use thiserror::Error;

/// Main error type for SmartClass operations
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Network/transport failure talking to the device store
    #[error("Connection error to '{url}': {message}")]
    Transport { url: String, message: String },

    /// The store answered with a non-success HTTP status
    #[error("Device store returned HTTP {status} for '{url}'")]
    HttpStatus { url: String, status: u16 },

    /// The response body could not be decoded
    #[error("Failed to decode response from '{url}': {message}")]
    Decode { url: String, message: String },

    /// Status outside the vocabulary of the device type
    #[error("Invalid status '{status}' for device type '{device_type}'")]
    InvalidStatus { device_type: String, status: String },

    /// Device type not known to the dashboard
    #[error("Unknown device type: {0}")]
    UnknownDeviceType(String),

    /// Device not found in the store
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Operator action not available in the current view state
    #[error("Action unavailable: {0}")]
    ActionUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error (config files, dashboard server sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Multiple errors occurred
    #[error("Multiple errors occurred ({count} errors)")]
    MultipleErrors {
        count: usize,
        errors: Vec<DashboardError>,
    },

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DashboardError>,
    },
}

impl DashboardError {
    /// Create a transport error
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an invalid status error
    pub fn invalid_status(device_type: impl Into<String>, status: impl Into<String>) -> Self {
        Self::InvalidStatus {
            device_type: device_type.into(),
            status: status.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Check if this error is recoverable (the next poll may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Io(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Result type alias for SmartClass operations
pub type Result<T> = std::result::Result<T, DashboardError>;

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Decode {
            url: String::new(),
            message: err.to_string(),
        }
    }
}

/// Collects multiple results into a single result
pub fn collect_errors<T>(results: Vec<Result<T>>) -> Result<Vec<T>> {
    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(value) => successes.push(value),
            Err(e) => errors.push(e),
        }
    }

    match errors.len() {
        0 => Ok(successes),
        1 => Err(errors.remove(0)),
        count => Err(DashboardError::MultipleErrors { count, errors }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverability() {
        assert!(DashboardError::transport("http://store", "refused").is_recoverable());
        assert!(DashboardError::HttpStatus { url: "http://store".into(), status: 503 }.is_recoverable());
        assert!(!DashboardError::HttpStatus { url: "http://store".into(), status: 404 }.is_recoverable());
        assert!(!DashboardError::invalid_status("light", "open").is_recoverable());

        let wrapped = DashboardError::transport("http://store", "reset").with_context("Loading devices");
        assert!(wrapped.is_recoverable());
    }

    #[test]
    fn test_invalid_status_message() {
        let err = DashboardError::invalid_status("door", "on");
        assert_eq!(err.to_string(), "Invalid status 'on' for device type 'door'");
    }

    #[test]
    fn test_collect_errors() {
        let results: Vec<Result<i32>> = vec![Ok(1), Ok(2), Ok(3)];
        assert_eq!(collect_errors(results).unwrap(), vec![1, 2, 3]);

        let results: Vec<Result<i32>> = vec![
            Ok(1),
            Err(DashboardError::DeviceNotFound("7".into())),
        ];
        assert!(matches!(collect_errors(results), Err(DashboardError::DeviceNotFound(_))));

        let results: Vec<Result<i32>> = vec![
            Err(DashboardError::DeviceNotFound("7".into())),
            Err(DashboardError::config("bad")),
        ];
        assert!(matches!(
            collect_errors(results),
            Err(DashboardError::MultipleErrors { count: 2, .. })
        ));
    }
}
