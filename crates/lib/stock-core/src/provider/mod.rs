//! Market-data provider seam and the record model it produces.

mod yahoo;

pub use yahoo::YahooProvider;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MarketResult;

/// One trading day's closing price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// Company background fields projected from the provider's profile.
///
/// This is the fixed allow-list: nothing outside these keys is ever
/// serialized, and absent fields are omitted rather than defaulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanyProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CompanyProfile {
    /// True when the provider returned no usable profile field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.short_name.is_none()
            && self.long_name.is_none()
            && self.sector.is_none()
            && self.industry.is_none()
            && self.website.is_none()
            && self.market.is_none()
            && self.market_cap.is_none()
            && self.country.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.phone.is_none()
    }
}

/// One labeled line item in a quarterly income statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeLine {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// One quarterly reporting period with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomePeriod {
    pub end_date: String,
    pub lines: Vec<IncomeLine>,
}

/// Everything fetched for one symbol, cached as a unit.
///
/// The cache key is the symbol only, so a field added here later is
/// visible to every cached consumer without re-keying.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerRecord {
    pub symbol: String,
    pub closes: Vec<DailyClose>,
    pub profile: CompanyProfile,
    pub income_statement: Vec<IncomePeriod>,
}

/// Provider seam: fetches the full record for one uppercase symbol.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_record(&self, symbol: &str) -> MarketResult<TickerRecord>;
}
