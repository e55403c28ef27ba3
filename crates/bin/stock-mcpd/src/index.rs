//! Ticker index wiring for the daemon.
//!
//! Builds the lazy connector so a missing or locked database file does
//! not stop the daemon at startup; the search path reports the failure
//! instead.

use std::sync::Arc;

use stock_core::index::{BuildIndexFn, IndexConnector, IndexError, TickerIndex};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, SurrealKv};

use crate::config::StockConfig;

#[must_use]
pub fn build_index_connector(config: &StockConfig) -> Arc<IndexConnector<Db>> {
    let db_path = config.db_path.clone();
    let in_memory = config.db_in_memory;
    let namespace = config.db_namespace.clone();
    let database = config.db_name.clone();

    let build: BuildIndexFn<Db> = Arc::new(move || {
        let db_path = db_path.clone();
        let namespace = namespace.clone();
        let database = database.clone();
        Box::pin(async move {
            let db = if in_memory {
                Surreal::new::<Mem>(()).await.map_err(IndexError::from)?
            } else {
                Surreal::new::<SurrealKv>(db_path.as_str())
                    .await
                    .map_err(IndexError::from)?
            };
            db.use_ns(namespace)
                .use_db(database)
                .await
                .map_err(IndexError::from)?;
            Ok(TickerIndex::new(db))
        })
    });

    Arc::new(IndexConnector::new(build))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::time::Duration;

    fn in_memory_config() -> StockConfig {
        StockConfig {
            db_path: String::new(),
            db_namespace: "stock".to_string(),
            db_name: "stock_tickers".to_string(),
            db_in_memory: true,
            cache_capacity: 128,
            retry_attempts: 2,
            retry_delay: Duration::from_secs(1),
            retry_not_found: true,
            log_file: PathBuf::from("stock_server.log"),
            enable_stdio: true,
            http_serve: false,
            mcp_http_addr: "127.0.0.1:4020".parse::<SocketAddr>().expect("valid addr"),
            seed_file: None,
        }
    }

    #[tokio::test]
    async fn in_memory_connector_comes_up_empty() {
        let connector = build_index_connector(&in_memory_config());
        let index = connector.get_or_connect().await.expect("connect");
        assert_eq!(index.count().await.expect("count"), 0);
    }
}
