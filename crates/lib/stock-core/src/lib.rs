//! Domain layer for stock-mcp.
//!
//! This crate owns the market-data provider seam, the bounded record
//! cache, the retry policy, the ticker index client, and the report
//! formatting the MCP surface serves to hosts.

pub mod cache;
pub mod error;
pub mod index;
pub mod provider;
pub mod retry;
pub mod service;

pub use cache::RecordCache;
pub use error::{MarketError, MarketResult};
pub use retry::RetryPolicy;
pub use service::MarketData;
