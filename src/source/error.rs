//! Error types for reading process statistics.
//!
//! [`StatParseError`] describes malformed procfs content, [`SourceError`] is what a
//! [`MetricSource`](super::MetricSource) reports for an optional stat group.
//!
//! # Example
//!
//! ```rust
//! use std::io;
//! use procrec::source::StatParseError;
//!
//! fn parse_field(val: &str) -> io::Result<u64> {
//!     let value = val.parse::<u64>().map_err(|e| StatParseError::InvalidValue {
//!         value: val.to_string(),
//!         line: 1,
//!         source: e,
//!     })?;
//!     Ok(value)
//! }
//!
//! parse_field("not-a-number").unwrap_err();
//! ```

use std::num::ParseIntError;

use thiserror::Error;

use crate::fsutil::FileOpenError;

#[derive(Debug, Error)]
pub enum StatParseError {
    #[error("duplicate field '{field}' at line {line}")]
    DuplicateField { field: String, line: usize },

    #[error("invalid value for '{key}' at line {line}: '{value}': {source}")]
    InvalidKeyValue {
        key: String,
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid value at line {line}: '{value}': {source}")]
    InvalidValue {
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("missing field {index} at line {line}")]
    MissingField { index: usize, line: usize },

    #[error("error during I/O: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StatParseError> for std::io::Error {
    fn from(err: StatParseError) -> Self {
        match err {
            StatParseError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

/// Failure to read one optional stat group.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The stat group cannot be obtained on this platform at all.
    #[error("not supported on this platform")]
    Unsupported,
    #[error(transparent)]
    FileOpen(#[from] FileOpenError),
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Returns `true` for the typed "unsupported on this platform" signal.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, SourceError::Unsupported)
    }
}

/// Extracts a `StatParseError` from an `std::io::Error` assuming it was wrapped.
///
/// Panics if the inner error is not a `StatParseError`. Intended for use in test assertions only.
#[cfg(test)]
pub(super) fn extract_stat_parse_error(err: &std::io::Error) -> &StatParseError {
    err.get_ref()
        .and_then(|e| e.downcast_ref::<StatParseError>())
        .unwrap()
}
