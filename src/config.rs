use std::fmt;
use std::str::FromStr;

/// Longest accepted line, terminator included; a line must be strictly shorter
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;
/// Most data rows accepted after the header
pub const DEFAULT_MAX_ROWS: usize = 20_000;
/// The header line is read with a wider allowance than data rows
pub const DEFAULT_MAX_HEADER_LEN: usize = 20_000;
pub const DEFAULT_KEY_COLUMN: &str = "name";

/// Size limits applied to the input file before and while it is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_line_len: usize,
    pub max_rows: usize,
    pub max_header_len: usize,
    pub max_file_size: u64,
}

impl Limits {
    /// Limits whose file-size cap is derived from the per-line and per-file
    /// row caps.
    pub fn new(max_line_len: usize, max_rows: usize) -> Self {
        Self {
            max_line_len,
            max_rows,
            max_header_len: DEFAULT_MAX_HEADER_LEN,
            max_file_size: (max_line_len as u64).saturating_mul(max_rows as u64),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN, DEFAULT_MAX_ROWS)
    }
}

/// What the ingestion loop does with a malformed data row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Stop at the first bad row and report it
    #[default]
    Abort,
    /// Log the bad row, count it and keep going
    Skip,
}

impl FromStr for RowPolicy {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(RowPolicy::Abort),
            "skip" => Ok(RowPolicy::Skip),
            _ => Err("expected 'abort' or 'skip'"),
        }
    }
}

impl fmt::Display for RowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowPolicy::Abort => f.write_str("abort"),
            RowPolicy::Skip => f.write_str("skip"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Header name of the column whose values are counted
    pub key_column: String,
    pub limits: Limits,
    pub row_policy: RowPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            limits: Limits::default(),
            row_policy: RowPolicy::default(),
        }
    }
}
