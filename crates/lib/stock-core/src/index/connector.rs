use std::pin::Pin;
use std::sync::Arc;

use surrealdb::Connection;
use tokio::sync::OnceCell;

use crate::index::surreal::{IndexResult, TickerIndex};

pub type BuildIndexFuture<C> =
    Pin<Box<dyn Future<Output = IndexResult<TickerIndex<C>>> + Send + 'static>>;
pub type BuildIndexFn<C> = Arc<dyn Fn() -> BuildIndexFuture<C> + Send + Sync + 'static>;

/// Lazily-connected handle to the ticker index.
///
/// The first caller runs the build closure; a failed connection leaves
/// the cell empty so a later call can try again. Once connected, the
/// handle is reused for the process lifetime.
pub struct IndexConnector<C: Connection> {
    cell: OnceCell<TickerIndex<C>>,
    build: BuildIndexFn<C>,
}

impl<C: Connection> IndexConnector<C> {
    pub fn new(build: BuildIndexFn<C>) -> Self {
        Self {
            cell: OnceCell::new(),
            build,
        }
    }

    /// # Errors
    /// Returns the build closure's error when the connection cannot be
    /// established.
    pub async fn get_or_connect(&self) -> IndexResult<&TickerIndex<C>> {
        self.cell.get_or_try_init(|| (self.build)()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::surreal::IndexError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use surrealdb::Surreal;
    use surrealdb::engine::local::{Db, Mem};

    #[tokio::test]
    async fn connects_once_and_reuses_the_handle() {
        let calls = Arc::new(AtomicUsize::new(0));
        let build_calls = calls.clone();
        let build: BuildIndexFn<Db> = Arc::new(move || {
            let calls = build_calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let db = Surreal::new::<Mem>(())
                    .await
                    .map_err(IndexError::from)?;
                db.use_ns("stock")
                    .use_db("stock_tickers")
                    .await
                    .map_err(IndexError::from)?;
                Ok(TickerIndex::new(db))
            })
        });

        let connector = IndexConnector::new(build);
        assert!(connector.get_or_connect().await.is_ok());
        assert!(connector.get_or_connect().await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_connection_is_retried_on_the_next_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let build_calls = calls.clone();
        let build: BuildIndexFn<Db> = Arc::new(move || {
            let calls = build_calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(IndexError::Unavailable("no such path".to_string()))
            })
        });

        let connector = IndexConnector::new(build);
        assert!(connector.get_or_connect().await.is_err());
        assert!(connector.get_or_connect().await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
