//! Report service: fetch-and-format for the MCP tool surface.
//!
//! Each report runs under the retry policy as a unit, so a transient
//! provider failure re-runs both the fetch and the formatting.

use std::sync::Arc;

use crate::cache::RecordCache;
use crate::error::{MarketError, MarketResult};
use crate::provider::{MarketDataProvider, TickerRecord};
use crate::retry::RetryPolicy;

pub struct MarketData {
    provider: Arc<dyn MarketDataProvider>,
    cache: RecordCache,
    retry: RetryPolicy,
}

impl MarketData {
    #[must_use]
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: RecordCache, retry: RetryPolicy) -> Self {
        Self {
            provider,
            cache,
            retry,
        }
    }

    async fn fetch(&self, symbol: &str) -> MarketResult<Arc<TickerRecord>> {
        self.cache
            .get_or_fetch(symbol, || self.provider.fetch_record(symbol))
            .await
    }

    /// One month of daily closes, as a date-indexed text series.
    ///
    /// # Errors
    /// Returns the last fetch error once retries are exhausted.
    pub async fn price_report(&self, ticker: &str) -> MarketResult<String> {
        let symbol = RecordCache::normalize(ticker);
        self.retry
            .execute("stock_price", || async {
                let record = self.fetch(&symbol).await?;
                Ok(format_price_report(&record))
            })
            .await
    }

    /// Allow-listed company background as indented JSON.
    ///
    /// # Errors
    /// Returns `EmptyProfile` when the provider has no usable profile,
    /// or the last fetch error once retries are exhausted.
    pub async fn info_report(&self, ticker: &str) -> MarketResult<String> {
        let symbol = RecordCache::normalize(ticker);
        self.retry
            .execute("stock_info", || async {
                let record = self.fetch(&symbol).await?;
                if record.profile.is_empty() {
                    return Err(MarketError::EmptyProfile(symbol.clone()));
                }
                format_info_report(&record)
            })
            .await
    }

    /// Quarterly income statement as a label-by-period table.
    ///
    /// # Errors
    /// Returns the last fetch error once retries are exhausted.
    pub async fn income_statement_report(&self, ticker: &str) -> MarketResult<String> {
        let symbol = RecordCache::normalize(ticker);
        self.retry
            .execute("income_statement", || async {
                let record = self.fetch(&symbol).await?;
                Ok(format_income_report(&record))
            })
            .await
    }
}

fn format_price_report(record: &TickerRecord) -> String {
    let mut out = format!("Stock price over the last month for {}: \n", record.symbol);
    for close in &record.closes {
        out.push_str(&format!("{}  {:>10.2}\n", close.date, close.close));
    }
    out
}

fn format_info_report(record: &TickerRecord) -> MarketResult<String> {
    let body = serde_json::to_string_pretty(&record.profile)
        .map_err(|err| MarketError::Provider(format!("profile serialization failed: {err}")))?;
    Ok(format!("Background information for {}: {body}", record.symbol))
}

fn format_income_report(record: &TickerRecord) -> String {
    let mut out = format!("Income statement for {}: \n", record.symbol);
    let Some(first) = record.income_statement.first() else {
        out.push_str("<no quarterly data>\n");
        return out;
    };

    let label_width = first
        .lines
        .iter()
        .map(|line| line.label.len())
        .max()
        .unwrap_or(0);

    let mut header = " ".repeat(label_width);
    for period in &record.income_statement {
        header.push_str(&format!("  {:>16}", period.end_date));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for line in &first.lines {
        let mut row = format!("{:<label_width$}", line.label);
        for period in &record.income_statement {
            let value = period
                .lines
                .iter()
                .find(|candidate| candidate.label == line.label)
                .and_then(|candidate| candidate.value);
            match value {
                Some(value) => row.push_str(&format!("  {value:>16.1}")),
                None => row.push_str(&format!("  {:>16}", "NaN")),
            }
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}
