//! Error types for loading trip logs and aggregating fields.

use thiserror::Error;

/// Failures that invalidate a whole load. These propagate to the caller.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("unknown city: {0}")]
    UnknownCity(String),

    #[error("invalid time filter: month '{month}', day '{day}'")]
    InvalidTimeFilter { month: String, day: String },

    #[error("trip log has no '{0}' column")]
    MissingColumn(String),

    #[error("failed to open trip log '{location}': {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to download trip log '{location}': {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed trip log: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures of a single aggregation. Report modules recover these locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("no values for field: {0}")]
    EmptyCollection(String),

    #[error("field '{field}' holds non-numeric value '{value}'")]
    TypeMismatch { field: String, value: String },
}
