use std::{error::Error, fmt, sync::Arc};

use stock_store::embedding::embed_text;
use stock_store::models::{SearchHit, TickerDoc};
use stock_store::schema::TABLE_TICKER;
use surrealdb::{Connection, Surreal};

#[derive(Debug)]
pub enum IndexError {
    Surreal(Box<surrealdb::Error>),
    Unavailable(String),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surreal(err) => write!(f, "SurrealDB error: {err}"),
            Self::Unavailable(message) => write!(f, "ticker database unavailable: {message}"),
        }
    }
}

impl Error for IndexError {}

impl From<surrealdb::Error> for IndexError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Surreal(Box::new(err))
    }
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Client for the persistent ticker collection.
///
/// The nearest-neighbor ranking itself runs inside the database; this
/// client only embeds the query text and shapes results.
pub struct TickerIndex<C: Connection> {
    db: Arc<Surreal<C>>,
}

impl<C: Connection> Clone for TickerIndex<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> TickerIndex<C> {
    #[must_use]
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db: Arc::new(db),
        }
    }

    #[must_use]
    pub const fn from_arc(db: Arc<Surreal<C>>) -> Self {
        Self { db }
    }

    #[must_use]
    pub fn db(&self) -> &Surreal<C> {
        &self.db
    }

    /// Embeds `name` and returns the nearest indexed tickers, closest
    /// first. `k` is clamped to at least one.
    ///
    /// # Errors
    /// Returns `IndexError` if the database query fails.
    pub async fn search_top(&self, name: &str, k: usize) -> IndexResult<Vec<SearchHit>> {
        let k = k.max(1);
        let query_vector = embed_text(name);
        // The KNN operator takes a literal neighbor count, so it is
        // interpolated; the embedding is bound.
        let query = format!(
            "SELECT doc_id, label, vector::distance::knn() AS distance \
             FROM {TABLE_TICKER} WHERE embedding <|{k},COSINE|> $query \
             ORDER BY distance;"
        );
        let mut response = self.db.query(query).bind(("query", query_vector)).await?;
        let hits: Vec<SearchHit> = response.take(0)?;
        Ok(hits)
    }

    /// Upserts one ticker document by its document id.
    ///
    /// # Errors
    /// Returns `IndexError` if the database write fails.
    pub async fn upsert_ticker(&self, doc: TickerDoc) -> IndexResult<TickerDoc> {
        let fallback = doc.clone();
        let record: Option<TickerDoc> = self
            .db
            .update((TABLE_TICKER, doc.doc_id.clone()))
            .content(doc)
            .await?;
        Ok(record.unwrap_or(fallback))
    }

    /// Counts indexed tickers.
    ///
    /// # Errors
    /// Returns `IndexError` if the database query fails.
    pub async fn count(&self) -> IndexResult<usize> {
        let query = format!("SELECT count() AS count FROM {TABLE_TICKER} GROUP ALL;");
        let mut response = self.db.query(query).await?;
        let row: Option<CountRow> = response.take(0)?;
        Ok(row.map_or(0, |row| row.count))
    }
}

#[derive(serde::Deserialize)]
struct CountRow {
    count: usize,
}
