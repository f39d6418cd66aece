use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::infrastructure::hash_table::ValueTag;

/// Global type definitions
///
/// Stores the error type, result alias and configuration shared by the
/// table engine and its drivers.
/// Default number of buckets for a table built from configuration
pub const DEFAULT_BUCKET_COUNT: usize = 1024;

/// Table error type
#[derive(Debug)]
pub enum TableError {
    /// Memory allocation error (bucket array, key copy, value copy or chain growth)
    AllocationFailure,
    /// A table was requested with zero buckets
    InvalidCapacity(usize),
    /// Typed lookup on an entry holding a value of another tag
    TagMismatch {
        /// Tag requested by the caller
        expected: ValueTag,
        /// Tag actually stored
        found: ValueTag,
    },
    /// Invalid configuration contents
    Config(String),
    /// I/O operation error
    IoError(std::io::Error),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::AllocationFailure => write!(f, "Memory allocation error"),
            TableError::InvalidCapacity(count) => {
                write!(f, "Invalid bucket count: {}", count)
            }
            TableError::TagMismatch { expected, found } => {
                write!(f, "Value tag mismatch: expected {}, found {}", expected, found)
            }
            TableError::Config(msg) => write!(f, "Configuration error: {}", msg),
            TableError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        TableError::IoError(err)
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::Config(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for TableError {
    fn from(_: std::collections::TryReserveError) -> Self {
        TableError::AllocationFailure
    }
}

/// Table result type
pub type TableResult<T> = Result<T, TableError>;

/// Table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Number of buckets per key domain
    pub bucket_count: usize,
    /// Whether drivers install a log subscriber
    pub enable_log: bool,
    /// Log level
    pub log_level: LogLevel,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            enable_log: true,
            log_level: LogLevel::Info,
        }
    }
}

impl TableConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> TableResult<Self> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> TableResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check the values a table cannot be built from
    pub fn validate(&self) -> TableResult<()> {
        if self.bucket_count == 0 {
            return Err(TableError::InvalidCapacity(self.bucket_count));
        }
        Ok(())
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level, every chain step
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
