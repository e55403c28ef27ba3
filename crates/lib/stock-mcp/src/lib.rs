//! MCP server implementation for stock-mcp.
//!
//! This crate wires the market-data service and the ticker index into
//! rmcp tool, resource, and prompt handlers.

mod helpers;
mod prompts;
mod tools;
pub mod server;

use std::sync::Arc;

use rmcp::handler::server::router::prompt::PromptRouter;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{
    CallToolResult,
    Content,
    ErrorCode,
    GetPromptRequestParams,
    GetPromptResult,
    ListPromptsResult,
    ListResourceTemplatesResult,
    ListResourcesResult,
    PaginatedRequestParams,
    RawResourceTemplate,
    ReadResourceRequestParams,
    ReadResourceResult,
    ResourceContents,
    ResourceTemplate,
    ServerCapabilities,
    ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData, ServerHandler, prompt_handler, tool, tool_handler, tool_router};
use stock_core::MarketData;
use stock_core::index::IndexConnector;
use surrealdb::Connection;

pub use prompts::summary_prompt;

const SERVER_INSTRUCTIONS: &str = r"stock-mcp provides MCP tools for looking up financial data.

Workflow:
1. If you only know a company name, read the `tickers://search/{stock_name}`
   resource to find its ticker symbol via similarity search.
2. Query data by ticker:
   - `stock_price` returns one month of daily closing prices.
   - `stock_info` returns company background (sector, industry, market cap, address).
   - `income_statement` returns the quarterly income statement.
3. Use the `stock_summary` prompt to summarise fetched data for a user.

Notes:
- Tickers are case-insensitive; results are cached per ticker for the
  life of the server.
- Failures are returned as plain-text error descriptions, never as
  protocol errors.
- `health` returns `ok`.";

const TICKER_SEARCH_TEMPLATE: &str = "tickers://search/{stock_name}";
const TICKER_SEARCH_PREFIX: &str = "tickers://search/";

/// Sentinel returned when the ticker database cannot be reached.
pub const INDEX_UNAVAILABLE: &str = "Error: Unable to connect to ticker database";

/// MCP server wrapper around the market-data service and ticker index.
#[derive(Clone)]
pub struct StockMcp<C: Connection> {
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
    market: Arc<MarketData>,
    index: Arc<IndexConnector<C>>,
}

impl<C: Connection> StockMcp<C> {
    #[must_use]
    pub fn new(market: Arc<MarketData>, index: Arc<IndexConnector<C>>) -> Self {
        Self {
            tool_router: Self::tool_router_core() + Self::tool_router_stock(),
            prompt_router: Self::prompt_router_stock(),
            market,
            index,
        }
    }

    /// Similarity search over the ticker index, as text.
    ///
    /// Total: connection failures yield [`INDEX_UNAVAILABLE`] and
    /// query failures a descriptive error string, never an `Err`.
    pub async fn search_tickers(&self, stock_name: &str) -> String {
        let index = match self.index.get_or_connect().await {
            Ok(index) => index,
            Err(err) => {
                tracing::error!(stock_name, error = %err, "ticker index unreachable");
                return INDEX_UNAVAILABLE.to_string();
            }
        };

        match index.search_top(stock_name, 1).await {
            Ok(hits) => serde_json::to_string(&hits)
                .unwrap_or_else(|err| format!("Error searching for ticker: {err}")),
            Err(err) => {
                tracing::error!(stock_name, error = %err, "ticker search failed");
                format!("Error searching for ticker: {err}")
            }
        }
    }

    /// One month of closing prices, or an error description.
    pub async fn price_text(&self, ticker: &str) -> String {
        match self.market.price_report(ticker).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(ticker, error = %err, "stock price lookup failed");
                format!("Error retrieving stock price for {ticker}: {err}")
            }
        }
    }

    /// Company background info, or an error description.
    pub async fn info_text(&self, ticker: &str) -> String {
        match self.market.info_report(ticker).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(ticker, error = %err, "stock info lookup failed");
                format!("Error retrieving stock info for {ticker}: {err}")
            }
        }
    }

    /// Quarterly income statement, or an error description.
    pub async fn income_statement_text(&self, ticker: &str) -> String {
        match self.market.income_statement_report(ticker).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(ticker, error = %err, "income statement lookup failed");
                format!("Error retrieving income statement for {ticker}: {err}")
            }
        }
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl<C: Connection> StockMcp<C> {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
#[prompt_handler]
impl<C: Connection> ServerHandler for StockMcp<C> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: Vec::new(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult {
            next_cursor: None,
            meta: None,
            resource_templates: vec![ResourceTemplate {
                raw: RawResourceTemplate {
                    uri_template: TICKER_SEARCH_TEMPLATE.to_string(),
                    name: "ticker_search".to_string(),
                    title: Some("Ticker search".to_string()),
                    description: Some(
                        "Find a stock ticker by company name, e.g. Google or \
                         Bank of America, via vector similarity search."
                            .to_string(),
                    ),
                    mime_type: Some("text/plain".to_string()),
                    icons: None,
                },
                annotations: None,
            }],
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParams { uri, .. }: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let Some(raw_name) = uri.strip_prefix(TICKER_SEARCH_PREFIX) else {
            return Err(helpers::mcp_err(
                ErrorCode::RESOURCE_NOT_FOUND,
                format!("unknown resource uri: {uri}"),
            ));
        };
        let stock_name = helpers::percent_decode(raw_name);
        let text = self.search_tickers(&stock_name).await;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stock_core::error::{MarketError, MarketResult};
    use stock_core::index::{BuildIndexFn, IndexError, TickerIndex};
    use stock_core::provider::{CompanyProfile, MarketDataProvider, TickerRecord};
    use stock_core::{RecordCache, RetryPolicy};
    use stock_store::embedding::embed_text;
    use stock_store::models::TickerDoc;
    use stock_store::schema::make_label;
    use surrealdb::Surreal;
    use surrealdb::engine::local::{Db, Mem};

    struct FailingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketDataProvider for FailingProvider {
        async fn fetch_record(&self, _symbol: &str) -> MarketResult<TickerRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(MarketError::Provider("connection refused".to_string()))
        }
    }

    struct StaticProvider(TickerRecord);

    #[async_trait]
    impl MarketDataProvider for StaticProvider {
        async fn fetch_record(&self, _symbol: &str) -> MarketResult<TickerRecord> {
            Ok(self.0.clone())
        }
    }

    fn market_with(provider: Arc<dyn MarketDataProvider>) -> Arc<MarketData> {
        Arc::new(MarketData::new(
            provider,
            RecordCache::new(8),
            RetryPolicy::fast(),
        ))
    }

    fn mem_connector() -> Arc<IndexConnector<Db>> {
        let build: BuildIndexFn<Db> = Arc::new(|| {
            Box::pin(async {
                let db = Surreal::new::<Mem>(()).await.map_err(IndexError::from)?;
                db.use_ns("stock")
                    .use_db("stock_tickers")
                    .await
                    .map_err(IndexError::from)?;
                let index = TickerIndex::new(db);
                let label = make_label("GOOG", "Alphabet Inc");
                index
                    .upsert_ticker(TickerDoc {
                        id: None,
                        doc_id: "1".to_string(),
                        symbol: "GOOG".to_string(),
                        embedding: embed_text(&label),
                        label,
                    })
                    .await?;
                Ok(index)
            })
        });
        Arc::new(IndexConnector::new(build))
    }

    fn broken_connector() -> Arc<IndexConnector<Db>> {
        let build: BuildIndexFn<Db> = Arc::new(|| {
            Box::pin(async { Err(IndexError::Unavailable("disk gone".to_string())) })
        });
        Arc::new(IndexConnector::new(build))
    }

    #[tokio::test]
    async fn failing_provider_yields_error_strings_with_the_ticker() {
        let provider = Arc::new(FailingProvider {
            calls: AtomicUsize::new(0),
        });
        let server = StockMcp::new(market_with(provider.clone()), mem_connector());

        let price = server.price_text("NVDA").await;
        assert!(price.starts_with("Error retrieving stock price for NVDA:"));

        let info = server.info_text("NVDA").await;
        assert!(info.starts_with("Error retrieving stock info for NVDA:"));

        let income = server.income_statement_text("NVDA").await;
        assert!(income.starts_with("Error retrieving income statement for NVDA:"));

        // One retry per operation: two provider calls each.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn search_is_never_empty_even_when_the_index_is_down() {
        let server = StockMcp::new(
            market_with(Arc::new(FailingProvider {
                calls: AtomicUsize::new(0),
            })),
            broken_connector(),
        );
        let result = server.search_tickers("Google").await;
        assert_eq!(result, INDEX_UNAVAILABLE);
    }

    #[tokio::test]
    async fn search_returns_serialized_hits() {
        let server = StockMcp::new(
            market_with(Arc::new(FailingProvider {
                calls: AtomicUsize::new(0),
            })),
            mem_connector(),
        );
        let result = server.search_tickers("Alphabet").await;
        assert!(result.contains("GOOG - Alphabet Inc"));
        assert!(result.contains("distance"));
    }

    #[tokio::test]
    async fn successful_lookups_pass_the_report_through() {
        let record = TickerRecord {
            symbol: "IBM".to_string(),
            closes: vec![stock_core::provider::DailyClose {
                date: chrono::NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
                close: 212.5,
            }],
            profile: CompanyProfile {
                long_name: Some("International Business Machines".to_string()),
                ..CompanyProfile::default()
            },
            income_statement: Vec::new(),
        };
        let server = StockMcp::new(market_with(Arc::new(StaticProvider(record))), mem_connector());

        let price = server.price_text("ibm").await;
        assert!(price.starts_with("Stock price over the last month for IBM: "));

        let info = server.info_text("IBM").await;
        assert!(info.starts_with("Background information for IBM: "));
    }
}
