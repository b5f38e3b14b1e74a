//! Error types for the encoding pipeline.
//!
//! Every failure in the pipeline is fatal: nothing is retried or skipped, and the
//! caller receives the first error encountered. The variants carry enough context
//! (column, row, offending value) to locate the bad cell in the input file.
//!
//! ```
//! use billcode::error::EncodeError;
//!
//! let err = EncodeError::MalformedHex {
//!     column: "SubscriptionId".to_owned(),
//!     row: 3,
//!     value: "not-hex".to_owned(),
//! };
//! assert!(err.to_string().contains("SubscriptionId"));
//! ```
//!
//! The `ResultExt` trait adds `.context()` to any result whose error converts into
//! [`EncodeError`]:
//!
//! ```no_run
//! use billcode::error::ResultExt as _;
//!
//! fn read_input() -> billcode::error::Result<String> {
//!     std::fs::read_to_string("bill.csv").context("Failed to read billing export")
//! }
//! ```

use std::fmt;

/// Main error type for encoding operations.
#[derive(Debug)]
pub enum EncodeError {
    /// I/O errors (reading the export, writing the output)
    Io(std::io::Error),

    /// Polars errors while scanning, filtering or writing frames
    DataProcessing(String),

    /// Invalid or unreadable configuration
    Config(String),

    /// A column named by the configuration is not in the frame
    MissingColumn(String),

    /// A date cell that does not match `%m/%d/%Y`
    MalformedDate {
        column: String,
        row: usize,
        value: String,
    },

    /// A hex-group cell that is not hexadecimal once dashes are removed
    MalformedHex {
        column: String,
        row: usize,
        value: String,
    },

    /// The embedding provider failed to load or could not embed a text
    Embedding(String),

    /// An encoded column group does not line up with the filtered rows
    Misaligned {
        group: String,
        expected: usize,
        found: usize,
    },

    /// File not found or unsupported path
    InvalidPath(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::MissingColumn(name) => write!(f, "Column not found: {name}"),
            Self::MalformedDate { column, row, value } => write!(
                f,
                "Malformed date in column '{column}' at row {row}: '{value}' (expected MM/DD/YYYY)"
            ),
            Self::MalformedHex { column, row, value } => write!(
                f,
                "Malformed hex identifier in column '{column}' at row {row}: '{value}'"
            ),
            Self::Embedding(msg) => write!(f, "Embedding error: {msg}"),
            Self::Misaligned {
                group,
                expected,
                found,
            } => write!(
                f,
                "Column group '{group}' has {found} rows, expected {expected}"
            ),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EncodeError {}

impl EncodeError {
    /// Rewrite the row of a cell-level error, e.g. from frame position to input row.
    #[must_use]
    pub fn map_row(self, map: impl FnOnce(usize) -> usize) -> Self {
        match self {
            Self::MalformedDate { column, row, value } => Self::MalformedDate {
                column,
                row: map(row),
                value,
            },
            Self::MalformedHex { column, row, value } => Self::MalformedHex {
                column,
                row: map(row),
                value,
            },
            other => other,
        }
    }
}

impl From<std::io::Error> for EncodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for EncodeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for EncodeError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

/// Result type alias for encoding operations.
pub type Result<T> = std::result::Result<T, EncodeError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<EncodeError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: EncodeError = e.into();
            EncodeError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: EncodeError = e.into();
            EncodeError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EncodeError::MissingColumn("Cost".to_owned());
        assert_eq!(err.to_string(), "Column not found: Cost");
    }

    #[test]
    fn test_malformed_date_display() {
        let err = EncodeError::MalformedDate {
            column: "_Date".to_owned(),
            row: 7,
            value: "2024-01-15".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed date in column '_Date' at row 7: '2024-01-15' (expected MM/DD/YYYY)"
        );
    }

    #[test]
    fn test_misaligned_display() {
        let err = EncodeError::Misaligned {
            group: "hash".to_owned(),
            expected: 3,
            found: 12,
        };
        assert_eq!(err.to_string(), "Column group 'hash' has 12 rows, expected 3");
    }

    #[test]
    fn test_map_row_only_touches_cell_errors() {
        let err = EncodeError::MalformedHex {
            column: "SubscriptionId".to_owned(),
            row: 1,
            value: "xyz".to_owned(),
        }
        .map_row(|row| row + 40);
        assert!(err.to_string().contains("at row 41"));

        let err = EncodeError::Config("bad".to_owned()).map_row(|_| unreachable!());
        assert_eq!(err.to_string(), "Configuration error: bad");
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "bill.csv",
        ));

        let result: Result<()> = result.context("Failed to read file");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read file")
        );
    }
}
