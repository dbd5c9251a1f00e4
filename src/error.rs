//! Error types for dispersim.
//!
//! All fallible operations return `Result<T, DispersionError>` instead of
//! panicking. Input errors are raised eagerly, before any flight-engine work
//! is spent on a malformed request.

use thiserror::Error;

/// Result type alias for dispersim operations.
pub type DispersionResult<T> = Result<T, DispersionError>;

/// Unified error type for all dispersim operations.
///
/// # Design
///
/// Two families, with different propagation policy:
/// 1. Input errors (data source, range, request, config) fail the whole
///    pipeline before the first simulation starts.
/// 2. Run failures (engine, timeout) are recorded against their run index
///    by the batch executor and do not abort the batch by default.
#[derive(Debug, Error)]
pub enum DispersionError {
    // ===== Input Errors =====
    /// Wind dataset missing, unreadable, or structurally invalid.
    #[error("Wind data source error: {message}")]
    DataSource {
        /// Description of the data source problem.
        message: String,
    },

    /// Date range unusable for sampling.
    #[error("Invalid date range: {message}")]
    InvalidRange {
        /// Description of the range problem.
        message: String,
    },

    /// Simulation request rejected before any work was done.
    #[error("Invalid simulation request: {message}")]
    InvalidRequest {
        /// Description of the request problem.
        message: String,
    },

    /// Rocket design reference unreadable or corrupt.
    #[error("Design load error: {message}")]
    DesignLoad {
        /// Description of the design problem.
        message: String,
    },

    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ===== Run Failures =====
    /// The external flight engine failed during a run.
    #[error("Flight engine error: {message}")]
    Engine {
        /// Description reported by the engine.
        message: String,
    },

    /// A single flight run exceeded the configured wall-time limit.
    #[error("Flight run timed out after {elapsed_ms} ms (limit: {limit_ms} ms)")]
    Timeout {
        /// Measured wall time of the run in milliseconds.
        elapsed_ms: u64,
        /// Configured limit in milliseconds.
        limit_ms: u64,
    },

    // ===== Statistics Errors =====
    /// Statistics requested over zero accumulated results.
    #[error("Empty data set: {message}")]
    EmptyData {
        /// What was requested on the empty collection.
        message: String,
    },

    // ===== Transport Conversions =====
    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispersionError {
    /// Create a data source error with a message.
    #[must_use]
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSource {
            message: message.into(),
        }
    }

    /// Create an invalid date range error.
    #[must_use]
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a design load error.
    #[must_use]
    pub fn design_load(message: impl Into<String>) -> Self {
        Self::DesignLoad {
            message: message.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a flight engine error.
    #[must_use]
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Create a run timeout error from the measured and configured durations.
    #[must_use]
    pub fn timeout(elapsed: std::time::Duration, limit: std::time::Duration) -> Self {
        Self::Timeout {
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            limit_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create an empty data error.
    #[must_use]
    pub fn empty_data(message: impl Into<String>) -> Self {
        Self::EmptyData {
            message: message.into(),
        }
    }

    /// Create an I/O error with a message (wraps in `std::io::Error`).
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(message.into()))
    }

    /// Check if this error is a per-run failure.
    ///
    /// Run failures are recorded against their run index and skipped; any
    /// other error aborts the batch regardless of the failure policy.
    #[must_use]
    pub const fn is_run_failure(&self) -> bool {
        matches!(self, Self::Engine { .. } | Self::Timeout { .. })
    }
}
