//! tweetrank counts the values of one column of a comma-separated file and
//! reports the most frequent ones.
//!
//! Counting happens in a [`RankedSequence`]: a doubly linked list kept in
//! descending count order one adjacent swap at a time, with a hash index from
//! key to entry so repeat lookups do not walk the list.

mod config;
pub use config::{IngestConfig, Limits, RowPolicy};

pub mod error;
pub use error::Error;

mod ingest;
pub use ingest::{ingest, normalize_key, rank_csv, IngestStats, Row, RowSource, EMPTY_KEY};

mod key_index;

mod log_level;
pub use log_level::LogLevel;

mod ranked_sequence;
pub use ranked_sequence::{Iter, Limit, RankedSequence, Tally};

mod table;
pub use table::{CsvFile, Header, Rows};
