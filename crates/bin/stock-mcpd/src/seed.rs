//! Optional ticker index seeding from a JSON-lines file.
//!
//! Each line holds one ticker: `{"doc_id": "1", "symbol": "NVDA",
//! "name": "NVIDIA Corporation"}`. Seeding upserts by `doc_id`, so
//! re-running against the same file is harmless.

use std::error::Error;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use stock_core::index::{IndexError, TickerIndex};
use stock_store::embedding::embed_text;
use stock_store::models::TickerDoc;
use stock_store::schema::make_label;
use surrealdb::Connection;

#[derive(Debug, Deserialize)]
struct SeedEntry {
    doc_id: String,
    symbol: String,
    name: String,
}

#[derive(Debug)]
pub enum SeedError {
    Io(std::io::Error),
    Parse { line: usize, source: serde_json::Error },
    Index(IndexError),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read seed file: {err}"),
            Self::Parse { line, source } => {
                write!(f, "invalid seed entry on line {line}: {source}")
            }
            Self::Index(err) => write!(f, "failed to write seed entry: {err}"),
        }
    }
}

impl Error for SeedError {}

impl From<std::io::Error> for SeedError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<IndexError> for SeedError {
    fn from(err: IndexError) -> Self {
        Self::Index(err)
    }
}

/// Loads every entry from `path` into the index. Returns the number of
/// tickers written.
///
/// # Errors
/// Fails on the first unreadable file, malformed line, or rejected
/// write.
pub async fn seed_from_file<C: Connection>(
    index: &TickerIndex<C>,
    path: &Path,
) -> Result<usize, SeedError> {
    let contents = tokio::fs::read_to_string(path).await?;
    let mut written = 0;

    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry: SeedEntry = serde_json::from_str(line).map_err(|source| SeedError::Parse {
            line: number + 1,
            source,
        })?;
        let label = make_label(&entry.symbol, &entry.name);
        index
            .upsert_ticker(TickerDoc {
                id: None,
                doc_id: entry.doc_id,
                symbol: entry.symbol,
                embedding: embed_text(&label),
                label,
            })
            .await?;
        written += 1;
    }

    tracing::info!(count = written, path = %path.display(), "seeded ticker index");
    Ok(written)
}
