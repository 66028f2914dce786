//! Error handling for the delivery pipeline.
//!
//! Fatal errors abort a run: [`InputError`] before anything touches the
//! store, [`PersistenceError`] while loading, [`ConfigError`] before either.
//! [`RowValidationError`] is never fatal; it is tallied in the validation
//! report and the offending row is excluded.

pub mod util;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// The raw extract could not be read
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Error opening or reading the file
    #[error("IO error for {}: {context}", .path.display())]
    Io {
        path: PathBuf,
        context: String,
        #[source]
        source: Option<io::Error>,
    },

    /// The CSV reader failed before any row could be decoded
    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The header lacks columns the cleaner depends on
    #[error("{} is missing required columns: {}", .path.display(), .missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    /// Header present but no data rows
    #[error("{} contains no data rows", .0.display())]
    Empty(PathBuf),
}

impl InputError {
    /// Create an IO error with context and no underlying source
    pub fn io(path: impl Into<PathBuf>, context: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            context: context.into(),
            source: None,
        }
    }

    /// Create an IO error wrapping the underlying `io::Error`
    pub fn io_with_source(
        path: impl Into<PathBuf>,
        context: impl Into<String>,
        source: io::Error,
    ) -> Self {
        Self::Io {
            path: path.into(),
            context: context.into(),
            source: Some(source),
        }
    }

    /// Attach the file path to an error produced from a bare reader
    #[must_use]
    pub fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            Self::Io {
                context, source, ..
            } => Self::Io {
                path,
                context,
                source,
            },
            Self::Csv { source, .. } => Self::Csv { path, source },
            Self::MissingColumns { missing, .. } => Self::MissingColumns { path, missing },
            Self::Empty(_) => Self::Empty(path),
        }
    }
}

/// A single raw row that cannot become a `DeliveryRecord`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowValidationError {
    /// The CSV reader could not decode the line
    #[error("line {line}: malformed row ({reason})")]
    Malformed { line: u64, reason: String },

    /// `Order_ID` is empty or a missing-value token
    #[error("line {line}: missing order id")]
    MissingOrderId { line: u64 },

    /// `Order_Date` is missing or matches no known format
    #[error("line {line}: invalid order date {value:?} for order {order_id}")]
    InvalidOrderDate {
        line: u64,
        order_id: String,
        value: Option<String>,
    },

    /// No known value exists anywhere to impute the field from
    #[error("line {line}: cannot impute {field} for order {order_id}")]
    Unimputable {
        line: u64,
        order_id: String,
        field: &'static str,
    },
}

impl RowValidationError {
    /// Short, stable label used to tally rejections in the report
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed_row",
            Self::MissingOrderId { .. } => "missing_order_id",
            Self::InvalidOrderDate { .. } => "invalid_order_date",
            Self::Unimputable { .. } => "unimputable",
        }
    }

    /// Source line of the rejected row (1-based, header is line 1)
    #[must_use]
    pub fn line(&self) -> u64 {
        match self {
            Self::Malformed { line, .. }
            | Self::MissingOrderId { line }
            | Self::InvalidOrderDate { line, .. }
            | Self::Unimputable { line, .. } => *line,
        }
    }
}

/// The relational store was unavailable or the load did not commit
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Opening the database failed
    #[error("failed to open store at {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The directory that should hold the database cannot be created
    #[error("store location {} is unreachable: {source}", .path.display())]
    Unreachable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A statement failed; the transaction was rolled back
    #[error("store operation '{operation}' failed: {source}")]
    Statement {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// The committed row count does not match what was inserted
    #[error("row count mismatch after load: expected {expected}, found {found}")]
    RowCountMismatch { expected: usize, found: usize },
}

impl PersistenceError {
    /// Wrap a rusqlite error with the name of the failing operation
    pub fn statement(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Statement { operation, source }
    }
}

/// Invalid configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid JSON for `PipelineConfig`
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of its allowed domain
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Top-level error for a pipeline run or a query
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing an output artifact (cleaned CSV, report) failed
    #[error("failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, DeliveryError>;
