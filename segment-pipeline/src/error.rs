//! Pipeline error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Empty username at line {line}")]
    EmptyUsername { line: usize },

    #[error("Cannot compute withdraw/deposit ratio for '{username}': deposit is zero")]
    DivisionByZero { username: String },

    #[error("Invalid username pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("No members left after filtering")]
    EmptyInput,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown amount field: {0}")]
    UnknownField(String),

    #[error("Unknown grade: {0}")]
    UnknownGrade(String),

    #[error("Unknown net category: {0}")]
    UnknownNetCategory(String),

    #[error("CSV error at line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for pipeline operations.
pub type SegmentResult<T> = Result<T, SegmentError>;
