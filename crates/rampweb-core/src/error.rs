//! Error types for rampweb-core
//!
//! Every failure in the transaction view (gateway calls, response decoding,
//! durable storage, corrupt approval snapshots) is a [`CoreError`].
//! Callers get a stable [`ErrorCode`], a severity and suggestions through
//! [`CoreError::to_details`].

use crate::gateway::{Endpoint, GatewayError};
use crate::storage::StorageError;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Remote data gateway call failed
    GatewayError,
    /// Request rejected by the data source
    InvalidRequest,
    /// Response payload did not match the expected shape
    DecodeError,
    /// Durable storage read or write failed
    StorageError,
    /// Stored approval snapshot is not a valid JSON map
    CorruptSnapshot,
    /// IO error
    IoError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::GatewayError => write!(f, "GATEWAY_ERROR"),
            ErrorCode::InvalidRequest => write!(f, "INVALID_REQUEST"),
            ErrorCode::DecodeError => write!(f, "DECODE_ERROR"),
            ErrorCode::StorageError => write!(f, "STORAGE_ERROR"),
            ErrorCode::CorruptSnapshot => write!(f, "CORRUPT_SNAPSHOT"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for rampweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Request '{endpoint}' failed: {source}")]
    Gateway {
        endpoint: Endpoint,
        #[source]
        source: GatewayError,
    },

    #[error("Could not decode response: {message}")]
    Decode { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Stored value under '{key}' is not a valid approval map: {message}")]
    CorruptSnapshot { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Gateway { source: GatewayError::InvalidRequest(_), .. } => ErrorCode::InvalidRequest,
            CoreError::Gateway { .. } => ErrorCode::GatewayError,
            CoreError::Decode { .. } => ErrorCode::DecodeError,
            CoreError::Storage(_) => ErrorCode::StorageError,
            CoreError::CorruptSnapshot { .. } => ErrorCode::CorruptSnapshot,
            CoreError::Io(_) => ErrorCode::IoError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Gateway { source: GatewayError::InvalidRequest(_), .. } => ErrorSeverity::Warning,
            CoreError::Gateway { .. } => ErrorSeverity::Error,
            CoreError::Decode { .. } => ErrorSeverity::Error,
            CoreError::Storage(_) => ErrorSeverity::Error,
            CoreError::CorruptSnapshot { .. } => ErrorSeverity::Warning,
            CoreError::Io(_) => ErrorSeverity::Error,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Gateway { endpoint, source } => {
                details = details.with_detail(serde_json::json!({
                    "endpoint": endpoint.as_str(),
                    "reason": source.to_string(),
                }));
                if !matches!(source, GatewayError::InvalidRequest(_)) {
                    details = details.with_suggestion(
                        "Check that the data gateway is reachable.".to_string()
                    );
                }
            }
            CoreError::CorruptSnapshot { key, .. } => {
                details = details.with_suggestion(format!(
                    "Remove the '{}' entry from the storage file to reset approvals.", key
                ));
            }
            CoreError::Storage(_) => {
                details = details.with_suggestion(
                    "Ensure the storage file location is writable.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::Decode {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Warning => log::warn!(
                target: "rampweb::error",
                "WARNING [{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "rampweb::error",
                "ERROR [{}] {} - Operation: {} - Data: {}",
                error.code(),
                error.to_details(),
                context.operation,
                context.data
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "rampweb::error",
            "WARNING: {} - Operation: {} - Data: {}",
            message,
            context.operation,
            context.data
        );
    }
}

// ==================== Tests ====================
