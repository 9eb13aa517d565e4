//! Comma-separated input, read from a memory map.
//!
//! Fields are split on every `,`; quoted fields containing commas are not
//! supported. Only the key column is checked for quoting: when the header
//! names it in double quotes every key must be wrapped in quotes, which are
//! removed, otherwise keys must not start or end with a quote.

use std::fs::File;
use std::path::{Path, PathBuf};
use memmap2::Mmap;

use crate::config::Limits;
use crate::error::{ConfigError, FormatError};
use crate::ingest::{Row, RowSource};

/// The resolved shape of the header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub field_count: usize,
    pub key_index: usize,
    /// The key column was named in double quotes
    pub quoted: bool,
}

impl Header {
    pub fn parse(line: &str, key_column: &str) -> Result<Header, ConfigError> {
        let quoted_name = format!("\"{}\"", key_column);
        let mut field_count = 0;
        let mut found: Option<(usize, bool)> = None;
        let mut matches = 0;

        for (i, field) in line.split(',').enumerate() {
            field_count += 1;
            let quoted = if field == key_column {
                false
            } else if field == quoted_name {
                true
            } else {
                continue;
            };
            matches += 1;
            if found.is_none() {
                found = Some((i, quoted));
            }
        }

        match (found, matches) {
            (Some((key_index, quoted)), 1) => Ok(Header {
                field_count,
                key_index,
                quoted,
            }),
            (Some(_), _) => Err(ConfigError::DuplicateKeyColumn {
                column: key_column.to_string(),
            }),
            (None, _) => Err(ConfigError::MissingKeyColumn {
                column: key_column.to_string(),
            }),
        }
    }

    /// Removes the key field's quoting according to the header.
    fn unquote_key(&self, key: &mut String, line: usize) -> Result<(), FormatError> {
        if self.quoted {
            if key.len() < 2 {
                return Err(FormatError::InvalidQuotes { line });
            }
            if !(key.starts_with('"') && key.ends_with('"')) {
                return Err(FormatError::MismatchedQuotes { line });
            }
            key.pop();
            key.remove(0);
        } else if key.starts_with('"') || key.ends_with('"') {
            return Err(FormatError::InvalidQuotes { line });
        }
        Ok(())
    }
}

/// A size-checked, memory-mapped CSV file
pub struct CsvFile {
    path: PathBuf,
    mmap: Mmap,
}

impl CsvFile {
    pub fn open(path: impl AsRef<Path>, limits: &Limits) -> Result<CsvFile, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| ConfigError::Open {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(open_err)?;
        let size = file.metadata().map_err(open_err)?.len();
        if size == 0 {
            return Err(ConfigError::EmptyFile { path: path.clone() });
        }
        if size > limits.max_file_size {
            return Err(ConfigError::FileTooLarge {
                size,
                limit: limits.max_file_size,
            });
        }

        // SAFETY: the map is read-only and lives no longer than `CsvFile`;
        // the file is not expected to be modified while it is being read.
        let mmap = unsafe { Mmap::map(&file) }.map_err(open_err)?;
        log::debug!("mapped {} ({} bytes)", path.display(), size);
        Ok(CsvFile { path, mmap })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves the header and returns it with an iterator over the data rows.
    pub fn rows(&self, key_column: &str, limits: &Limits) -> Result<(Header, Rows<'_>), ConfigError> {
        let (raw, rest) = split_line(&self.mmap);
        if raw.len() >= limits.max_header_len {
            return Err(ConfigError::HeaderTooLong {
                limit: limits.max_header_len,
            });
        }
        let text = String::from_utf8_lossy(trim_terminator(raw));
        let header = Header::parse(&text, key_column)?;

        let rows = Rows {
            rest,
            header: header.clone(),
            limits: *limits,
            line: 1,
            rows_read: 0,
            done: false,
        };
        Ok((header, rows))
    }
}

/// Iterator over the data rows of a [`CsvFile`]
pub struct Rows<'a> {
    rest: &'a [u8],
    header: Header,
    limits: Limits,
    line: usize,
    rows_read: usize,
    done: bool,
}

impl<'a> Rows<'a> {
    fn parse_row(&self, raw: &[u8]) -> Result<Row, FormatError> {
        let line = self.line;
        if raw.len() >= self.limits.max_line_len {
            return Err(FormatError::LineTooLong {
                line,
                len: raw.len(),
                limit: self.limits.max_line_len,
            });
        }

        let text = std::str::from_utf8(trim_terminator(raw))
            .map_err(|_| FormatError::InvalidUtf8 { line })?;
        let mut fields: Vec<String> = text.split(',').map(str::to_owned).collect();
        if fields.len() != self.header.field_count {
            return Err(FormatError::FieldCount {
                line,
                expected: self.header.field_count,
                found: fields.len(),
            });
        }

        self.header.unquote_key(&mut fields[self.header.key_index], line)?;
        Ok(Row { line, fields })
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Result<Row, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.rest.is_empty() {
            return None;
        }

        self.rows_read += 1;
        if self.rows_read > self.limits.max_rows {
            self.done = true;
            return Some(Err(FormatError::TooManyRows {
                limit: self.limits.max_rows,
            }));
        }

        let (raw, rest) = split_line(self.rest);
        self.rest = rest;
        self.line += 1;
        Some(self.parse_row(raw))
    }
}

impl<'a> RowSource for Rows<'a> {
    fn next_row(&mut self) -> Option<Result<Row, FormatError>> {
        self.next()
    }
}

/// Splits off the first line, terminator included.
fn split_line(bytes: &[u8]) -> (&[u8], &[u8]) {
    match bytes.iter().position(|&b| b == b'\n') {
        Some(end) => bytes.split_at(end + 1),
        None => (bytes, &[]),
    }
}

fn trim_terminator(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}
