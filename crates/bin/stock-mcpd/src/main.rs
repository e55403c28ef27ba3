//! Daemon entry point for the stock MCP server.
//!
//! Loads configuration from the environment, wires the market data
//! service and ticker index, and serves the MCP protocol over stdio
//! and, optionally, streamable HTTP.

mod config;
mod index;
mod logging;
mod seed;

use std::sync::Arc;

use stock_core::provider::YahooProvider;
use stock_core::{MarketData, RecordCache, RetryPolicy};
use stock_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};

use crate::config::StockConfig;
use crate::index::build_index_connector;
use crate::seed::seed_from_file;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = StockConfig::from_args()?;
    let _log_guard = logging::init(&config.log_file)?;

    let connector = build_index_connector(&config);
    if let Some(seed_file) = &config.seed_file {
        let ticker_index = connector.get_or_connect().await?;
        seed_from_file(ticker_index, seed_file).await?;
    }

    let retry = RetryPolicy {
        max_attempts: config.retry_attempts,
        delay: config.retry_delay,
        retry_not_found: config.retry_not_found,
    };
    let market = Arc::new(MarketData::new(
        Arc::new(YahooProvider::new()),
        RecordCache::new(config.cache_capacity),
        retry,
    ));

    tracing::info!(
        cache_capacity = config.cache_capacity,
        retry_attempts = config.retry_attempts,
        in_memory = config.db_in_memory,
        "starting stock MCP daemon"
    );

    let http_task = if config.http_serve {
        let market = market.clone();
        let connector = connector.clone();
        let http_config = McpHttpServerConfig::new(config.mcp_http_addr);
        tracing::info!(addr = %config.mcp_http_addr, "serving MCP over streamable HTTP");
        Some(tokio::spawn(async move {
            serve_streamable_http(market, connector, http_config).await
        }))
    } else {
        None
    };

    if config.enable_stdio {
        serve_stdio(market, connector).await?;
    } else if let Some(task) = http_task {
        task.await??;
    } else {
        tracing::warn!("no transport enabled, exiting");
    }

    Ok(())
}
