use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use surrealdb::Connection;

use crate::StockMcp;

/// Parameters for the ticker-keyed lookup tools.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TickerParams {
    /// Alphanumeric stock ticker, e.g. "NVDA". Case-insensitive.
    pub stock_ticker: String,
}

#[tool_router(router = tool_router_stock, vis = "pub")]
impl<C: Connection> StockMcp<C> {
    #[tool(
        description = "Daily closing prices over the last month for a stock ticker, \
                       e.g. \"NVDA\". Returns a date-indexed price series as text."
    )]
    async fn stock_price(
        &self,
        Parameters(params): Parameters<TickerParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let text = self.price_text(&params.stock_ticker).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        description = "Company background information for a stock ticker, e.g. \"IBM\": \
                       name, sector, industry, website, market cap, and address fields."
    )]
    async fn stock_info(
        &self,
        Parameters(params): Parameters<TickerParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let text = self.info_text(&params.stock_ticker).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        description = "Quarterly income statement for a stock ticker, e.g. \"BAC\", \
                       as a line-item by period table."
    )]
    async fn income_statement(
        &self,
        Parameters(params): Parameters<TickerParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let text = self.income_statement_text(&params.stock_ticker).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}
