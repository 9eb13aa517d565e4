//! Error types for tweetrank.
//!
//! - [`ConfigError`]: the input cannot be used at all (missing file, bad header).
//!   Raised before any ranking work begins.
//! - [`FormatError`]: a data row disagrees with the header or the size limits.
//!   Whether a row-level one aborts the run is decided by [`RowPolicy`](crate::RowPolicy).
//! - [`ResourceError`]: the ranking could not grow. Always fatal.
//! - [`InvariantError`]: returned by `RankedSequence::check_invariants`.

use std::collections::TryReserveError;
use std::path::PathBuf;

/// Top-level error returned by the reader and the ingestion loop
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("nothing in CSV file {}", .path.display())]
    EmptyFile { path: PathBuf },
    #[error("CSV file is {size} bytes, greater than the maximum of {limit}")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("header exceeds the maximum length of {limit} characters")]
    HeaderTooLong { limit: usize },
    #[error("no '{column}' column found in header")]
    MissingKeyColumn { column: String },
    #[error("more than one '{column}' column in header")]
    DuplicateKeyColumn { column: String },
}

#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("line {line}: wrong number of fields (expected {expected}, found {found})")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: {len} characters, lines must be shorter than {limit}")]
    LineTooLong { line: usize, len: usize, limit: usize },
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 { line: usize },
    #[error("line {line}: invalid quotes in key field")]
    InvalidQuotes { line: usize },
    #[error("line {line}: mismatching quotes in key field")]
    MismatchedQuotes { line: usize },
    #[error("CSV file has more than {limit} data rows")]
    TooManyRows { limit: usize },
}

impl FormatError {
    /// `true` when only the offending row is bad and the rest of the file can
    /// still be read.
    pub fn is_row_level(&self) -> bool {
        !matches!(self, FormatError::TooManyRows { .. })
    }
}

#[derive(thiserror::Error, Debug)]
#[error("couldn't allocate memory for key of {key_len} bytes: {source}")]
pub struct ResourceError {
    pub key_len: usize,
    #[source]
    pub source: TryReserveError,
}

/// Error returned when the ranking's internal invariants are violated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}
