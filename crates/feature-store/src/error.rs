//! Feature Store Error Types

use thiserror::Error;

/// Errors raised while loading or reading the feature table
#[derive(Debug, Error)]
pub enum FeatureStoreError {
    /// Source file could not be opened or read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Source file is not a well-formed CSV table
    #[error("Failed to parse feature table: {0}")]
    Parse(#[from] polars::prelude::PolarsError),

    /// A column a consumer relies on is absent
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// Column lengths disagree when building a table
    #[error("Column {column} has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Row index outside the table
    #[error("Row index {index} out of range for {len} rows")]
    RowOutOfRange { index: usize, len: usize },

    /// No rows carry the requested machine id
    #[error("Unknown machine id: {0}")]
    UnknownMachine(String),
}
