use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{GetPromptResult, PromptMessage, PromptMessageRole},
    prompt,
    prompt_router,
    schemars,
};
use serde::{Deserialize, Serialize};
use surrealdb::Connection;

use crate::StockMcp;

/// Arguments for the stock summary prompt.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StockSummaryArgs {
    /// Raw stock data to summarise, e.g. the output of `stock_price`.
    pub stock_data: String,
}

#[prompt_router(router = "prompt_router_stock", vis = "pub")]
impl<C: Connection> StockMcp<C> {
    #[prompt(
        name = "stock_summary",
        description = "Prompt template for summarising stock price data."
    )]
    async fn stock_summary(
        &self,
        Parameters(args): Parameters<StockSummaryArgs>,
    ) -> Result<GetPromptResult, ErrorData> {
        Ok(GetPromptResult {
            description: Some("Summarise the pertinent points of stock data".to_string()),
            messages: vec![PromptMessage::new_text(
                PromptMessageRole::User,
                summary_prompt(&args.stock_data),
            )],
        })
    }
}

/// Pure template: no failure modes.
#[must_use]
pub fn summary_prompt(stock_data: &str) -> String {
    format!(
        "You are a helpful financial assistant designed to summarise stock data.\n\
         Using the information below, summarise the pertinent points relevant to \
         stock price movement.\n\
         Data {stock_data}"
    )
}
