//! Error types for the data-loader crate.
//!
//! Every failure of the data-access collaborator surfaces as a
//! [`DataLoadError`]. The loader never hands out a partially built matrix:
//! any error here aborts the whole load.

use thiserror::Error;

/// Errors that can occur while reading students, courses and choices
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    ///
    /// Carries the file and 1-based line number so bad rows can be located.
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The backing store could not answer a query
    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
