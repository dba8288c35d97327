//! # Error Types
//!
//! Defines `RowForgeError`, the unified error enum for every failure mode in
//! the Rowforge pipeline. Every variant includes enough context (strategy
//! name, column name, config path, observed values) to debug immediately
//! without digging through logs. Each variant also maps to a fixed
//! (category, severity) pair consumed by the run-level error collector.

use thiserror::Error;

/// How bad an error is. CRITICAL halts the run; everything below is
/// recorded and the run continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

/// Which part of the pipeline an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Config,
    Strategy,
    Processing,
    Network,
    System,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Config => "CONFIG",
            Category::Strategy => "STRATEGY",
            Category::Processing => "PROCESSING",
            Category::Network => "NETWORK",
            Category::System => "SYSTEM",
        };
        write!(f, "{}", s)
    }
}

/// All errors that can occur in Rowforge operations.
#[derive(Error, Debug)]
pub enum RowForgeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid parameter '{field}' for {strategy}: {reason}")]
    InvalidParam {
        strategy: String,
        field: String,
        reason: String,
    },

    #[error("Unsupported strategy '{name}'. Known strategies: run `rowforge strategies` or call list_strategies()")]
    UnsupportedStrategy { name: String },

    #[error("Invalid running mode: stream and batch are mutually exclusive")]
    InvalidRunningMode,

    #[error("Column '{column}' references '{referenced}', which is not produced by an earlier config entry. Reorder the configs so '{referenced}' comes first")]
    ForwardReference { column: String, referenced: String },

    #[error("Distribution weights for {strategy} must sum to 100, got {observed}")]
    WeightSum { strategy: String, observed: i64 },

    #[error("Unparseable {what} '{value}' for format '{format}'")]
    BadTemporalFormat {
        what: &'static str,
        value: String,
        format: String,
    },

    #[error("Strategy {strategy} failed on column '{column}': {message}")]
    StrategyFailure {
        strategy: String,
        column: String,
        message: String,
    },

    #[error("Mask '{mask}' matched no rows for column '{column}'; column left untouched")]
    MaskNoMatch { column: String, mask: String },

    #[error("Mask '{mask}' could not be evaluated for column '{column}' ({reason}); applied to all rows")]
    MaskInvalid {
        column: String,
        mask: String,
        reason: String,
    },

    #[error("Pattern for column '{column}' produced only {distinct} distinct values in {attempts} attempts; padded {padded} rows by resampling existing uniques")]
    UniquePadding {
        column: String,
        distinct: usize,
        attempts: usize,
        padded: usize,
    },

    #[error("Could not connect to {endpoint}: {message}")]
    QueueConnect { endpoint: String, message: String },

    #[error("Publish to '{queue}' failed: {message}")]
    QueuePublish { queue: String, message: String },

    #[error("Writer received a write after finalize()")]
    WriterFinalized,

    #[error("Failed writing {format} output to {path}: {message}")]
    Format {
        format: String,
        path: String,
        message: String,
    },

    #[error("I/O error while {action}: {source}")]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl RowForgeError {
    /// Stable machine-readable code for reports and the structured export.
    pub fn code(&self) -> &'static str {
        match self {
            RowForgeError::Config { .. } => "CONFIG_INVALID",
            RowForgeError::InvalidParam { .. } => "CONFIG_INVALID_PARAM",
            RowForgeError::UnsupportedStrategy { .. } => "CONFIG_UNSUPPORTED_STRATEGY",
            RowForgeError::InvalidRunningMode => "CONFIG_INVALID_RUNNING_MODE",
            RowForgeError::ForwardReference { .. } => "CONFIG_FORWARD_REFERENCE",
            RowForgeError::WeightSum { .. } => "CONFIG_WEIGHT_SUM",
            RowForgeError::BadTemporalFormat { .. } => "CONFIG_BAD_TEMPORAL_FORMAT",
            RowForgeError::StrategyFailure { .. } => "STRATEGY_FAILURE",
            RowForgeError::MaskNoMatch { .. } => "PROCESSING_MASK_NO_MATCH",
            RowForgeError::MaskInvalid { .. } => "PROCESSING_MASK_INVALID",
            RowForgeError::UniquePadding { .. } => "PROCESSING_UNIQUE_PADDING",
            RowForgeError::QueueConnect { .. } => "NETWORK_QUEUE_CONNECT",
            RowForgeError::QueuePublish { .. } => "NETWORK_QUEUE_PUBLISH",
            RowForgeError::WriterFinalized => "SYSTEM_WRITER_FINALIZED",
            RowForgeError::Format { .. } => "SYSTEM_FORMAT_WRITE",
            RowForgeError::Io { .. } => "SYSTEM_IO",
            RowForgeError::Other(_) => "OTHER",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RowForgeError::UnsupportedStrategy { .. } | RowForgeError::InvalidRunningMode => {
                Severity::Critical
            }
            RowForgeError::MaskNoMatch { .. }
            | RowForgeError::MaskInvalid { .. }
            | RowForgeError::UniquePadding { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            RowForgeError::Config { .. }
            | RowForgeError::InvalidParam { .. }
            | RowForgeError::UnsupportedStrategy { .. }
            | RowForgeError::InvalidRunningMode
            | RowForgeError::ForwardReference { .. }
            | RowForgeError::WeightSum { .. }
            | RowForgeError::BadTemporalFormat { .. } => Category::Config,
            RowForgeError::StrategyFailure { .. } => Category::Strategy,
            RowForgeError::MaskNoMatch { .. }
            | RowForgeError::MaskInvalid { .. }
            | RowForgeError::UniquePadding { .. } => Category::Processing,
            RowForgeError::QueueConnect { .. } | RowForgeError::QueuePublish { .. } => {
                Category::Network
            }
            RowForgeError::WriterFinalized
            | RowForgeError::Format { .. }
            | RowForgeError::Io { .. }
            | RowForgeError::Other(_) => Category::System,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity() == Severity::Critical
    }
}

pub type Result<T> = std::result::Result<T, RowForgeError>;
