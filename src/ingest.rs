use std::path::Path;

use crate::config::{IngestConfig, RowPolicy};
use crate::error::{Error, FormatError};
use crate::ranked_sequence::RankedSequence;
use crate::table::CsvFile;

/// Key recorded for rows whose key field is empty
pub const EMPTY_KEY: &str = "empty";

/// One tokenized data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based line number in the input, the header being line 1
    pub line: usize,
    pub fields: Vec<String>,
}

/// A lazy stream of tokenized rows, each already checked against the header
#[cfg_attr(test, mockall::automock)]
pub trait RowSource {
    fn next_row(&mut self) -> Option<Result<Row, FormatError>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Rows whose key was recorded
    pub rows: usize,
    /// Rows dropped under [`RowPolicy::Skip`]
    pub skipped: usize,
}

pub fn normalize_key(key: &str) -> &str {
    if key.is_empty() {
        EMPTY_KEY
    } else {
        key
    }
}

/// Feeds the key field of every row into `ranking`.
///
/// Row-level format errors are returned or skipped according to `policy`;
/// file-level format errors and allocation failures always stop ingestion.
pub fn ingest<S: RowSource + ?Sized>(
    source: &mut S,
    key_index: usize,
    policy: RowPolicy,
    ranking: &mut RankedSequence,
) -> Result<IngestStats, Error> {
    let mut stats = IngestStats::default();

    while let Some(next) = source.next_row() {
        let key = next.and_then(|row| match row.fields.get(key_index) {
            Some(key) => Ok(normalize_key(key).to_owned()),
            None => Err(FormatError::FieldCount {
                line: row.line,
                expected: key_index + 1,
                found: row.fields.len(),
            }),
        });

        match key {
            Ok(key) => {
                ranking.record_occurrence(&key)?;
                stats.rows += 1;
            }
            Err(e) if e.is_row_level() && policy == RowPolicy::Skip => {
                log::warn!("Skipping row: {}", e);
                stats.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(stats)
}

/// Opens `path`, resolves its header and ranks every row.
pub fn rank_csv(
    path: impl AsRef<Path>,
    config: &IngestConfig,
) -> Result<(RankedSequence, IngestStats), Error> {
    let table = CsvFile::open(path, &config.limits)?;
    let (header, mut rows) = table.rows(&config.key_column, &config.limits)?;
    log::info!(
        "Counting column '{}' (field {} of {}{}) in {}",
        config.key_column,
        header.key_index + 1,
        header.field_count,
        if header.quoted { ", quoted" } else { "" },
        table.path().display()
    );

    let mut ranking = RankedSequence::new();
    let stats = ingest(&mut rows, header.key_index, config.row_policy, &mut ranking)?;
    log::info!(
        "Read {} rows ({} skipped), {} distinct keys",
        stats.rows,
        stats.skipped,
        ranking.len()
    );
    Ok((ranking, stats))
}
