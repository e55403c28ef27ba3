//! Yahoo Finance implementation of the provider seam.
//!
//! Price history comes from the chart API via `yahoo_finance_api`;
//! company profile and the quarterly income statement come from the
//! quoteSummary endpoint, which requires crumb/cookie authentication.

use chrono::DateTime;
use reqwest::header;
use serde::Deserialize;
use tokio::sync::RwLock;
use yahoo_finance_api as yahoo;

use crate::error::{MarketError, MarketResult};
use crate::provider::{
    CompanyProfile,
    DailyClose,
    IncomeLine,
    IncomePeriod,
    MarketDataProvider,
    TickerRecord,
};

const CRUMB_COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const QUOTE_SUMMARY_MODULES: &str = "price,summaryProfile,incomeStatementHistoryQuarterly";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Income statement line items, in presentation order. Keys are the
/// provider's camelCase field names.
const INCOME_LINE_ITEMS: &[(&str, &str)] = &[
    ("totalRevenue", "Total Revenue"),
    ("costOfRevenue", "Cost Of Revenue"),
    ("grossProfit", "Gross Profit"),
    ("researchDevelopment", "Research Development"),
    ("sellingGeneralAdministrative", "Selling General Administrative"),
    ("totalOperatingExpenses", "Total Operating Expenses"),
    ("operatingIncome", "Operating Income"),
    ("totalOtherIncomeExpenseNet", "Total Other Income Expense Net"),
    ("ebit", "EBIT"),
    ("interestExpense", "Interest Expense"),
    ("incomeBeforeTax", "Income Before Tax"),
    ("incomeTaxExpense", "Income Tax Expense"),
    ("netIncome", "Net Income"),
];

#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

pub struct YahooProvider {
    http: reqwest::Client,
    crumb: RwLock<Option<CrumbData>>,
}

impl YahooProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            crumb: RwLock::new(None),
        }
    }

    async fn fetch_history(&self, symbol: &str) -> MarketResult<Vec<DailyClose>> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|err| MarketError::Provider(err.to_string()))?;
        let response = connector
            .get_quote_range(symbol, "1d", "1mo")
            .await
            .map_err(|err| map_yahoo_error(symbol, &err))?;
        let quotes = response
            .quotes()
            .map_err(|err| map_yahoo_error(symbol, &err))?;
        if quotes.is_empty() {
            return Err(MarketError::NotFound(symbol.to_string()));
        }

        Ok(quotes
            .iter()
            .filter_map(|quote| {
                let seconds = i64::try_from(quote.timestamp).ok()?;
                DateTime::from_timestamp(seconds, 0).map(|ts| DailyClose {
                    date: ts.date_naive(),
                    close: quote.close,
                })
            })
            .collect())
    }

    async fn ensure_crumb(&self) -> MarketResult<CrumbData> {
        if let Some(crumb) = self.crumb.read().await.clone() {
            return Ok(crumb);
        }

        let response = self
            .http
            .get(CRUMB_COOKIE_URL)
            .send()
            .await
            .map_err(|err| MarketError::Provider(err.to_string()))?;
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split_once(';').map(|(cookie, _)| cookie))
            .ok_or_else(|| {
                MarketError::Provider("missing Set-Cookie header from crumb endpoint".to_string())
            })?
            .to_string();

        let crumb = self
            .http
            .get(CRUMB_URL)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|err| MarketError::Provider(err.to_string()))?
            .text()
            .await
            .map_err(|err| MarketError::Provider(err.to_string()))?;

        let crumb_data = CrumbData { cookie, crumb };
        *self.crumb.write().await = Some(crumb_data.clone());
        Ok(crumb_data)
    }

    async fn fetch_quote_summary(
        &self,
        symbol: &str,
    ) -> MarketResult<(CompanyProfile, Vec<IncomePeriod>)> {
        let crumb = self.ensure_crumb().await?;
        let url = format!(
            "{QUOTE_SUMMARY_URL}/{symbol}?modules={QUOTE_SUMMARY_MODULES}&crumb={}",
            crumb.crumb
        );
        let body = self
            .http
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|err| MarketError::Provider(err.to_string()))?
            .text()
            .await
            .map_err(|err| MarketError::Provider(err.to_string()))?;

        parse_quote_summary(&body)
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch_record(&self, symbol: &str) -> MarketResult<TickerRecord> {
        tracing::info!(symbol, "fetching ticker record");
        let closes = self.fetch_history(symbol).await?;

        // A missing profile only fails the info operation, not the
        // whole record; price history alone is still servable.
        let (profile, income_statement) = match self.fetch_quote_summary(symbol).await {
            Ok(summary) => summary,
            Err(err) => {
                tracing::warn!(symbol, error = %err, "quote summary unavailable");
                (CompanyProfile::default(), Vec::new())
            }
        };

        tracing::info!(
            symbol,
            days = closes.len(),
            name = profile.long_name.as_deref().unwrap_or("<unknown>"),
            "fetched ticker record"
        );
        Ok(TickerRecord {
            symbol: symbol.to_string(),
            closes,
            profile,
            income_statement,
        })
    }
}

fn map_yahoo_error(symbol: &str, err: &yahoo::YahooError) -> MarketError {
    match err {
        yahoo::YahooError::EmptyDataSet => MarketError::NotFound(symbol.to_string()),
        other => MarketError::Provider(other.to_string()),
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: EnvelopeBody,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct EnvelopeBody {
    result: Option<Vec<Modules>>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Modules {
    price: Option<PriceModule>,
    summary_profile: Option<SummaryProfileModule>,
    income_statement_history_quarterly: Option<IncomeHistoryModule>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PriceModule {
    short_name: Option<String>,
    long_name: Option<String>,
    market: Option<String>,
    market_cap: Option<FormattedValue>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FormattedValue {
    raw: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct DateValue {
    fmt: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SummaryProfileModule {
    sector: Option<String>,
    industry: Option<String>,
    website: Option<String>,
    country: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    phone: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct IncomeHistoryModule {
    income_statement_history: Vec<RawStatement>,
}

#[derive(Deserialize)]
struct RawStatement {
    #[serde(rename = "endDate", default)]
    end_date: DateValue,
    #[serde(flatten)]
    items: serde_json::Map<String, serde_json::Value>,
}

/// Projects the quoteSummary payload into the fixed profile allow-list
/// and the quarterly income statement periods.
fn parse_quote_summary(body: &str) -> MarketResult<(CompanyProfile, Vec<IncomePeriod>)> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|err| MarketError::Provider(format!("quoteSummary parse failed: {err}")))?;
    let modules = envelope
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .unwrap_or_default();

    let price = modules.price.unwrap_or_default();
    let summary = modules.summary_profile.unwrap_or_default();
    let profile = CompanyProfile {
        short_name: price.short_name,
        long_name: price.long_name,
        sector: summary.sector,
        industry: summary.industry,
        website: summary.website,
        market: price.market,
        market_cap: price.market_cap.and_then(|value| value.raw),
        country: summary.country,
        city: summary.city,
        state: summary.state,
        zip: summary.zip,
        phone: summary.phone,
    };

    let income_statement = modules
        .income_statement_history_quarterly
        .unwrap_or_default()
        .income_statement_history
        .into_iter()
        .map(|statement| IncomePeriod {
            end_date: statement.end_date.fmt.unwrap_or_default(),
            lines: INCOME_LINE_ITEMS
                .iter()
                .map(|(key, label)| IncomeLine {
                    label: (*label).to_string(),
                    value: statement
                        .items
                        .get(*key)
                        .and_then(|item| item.get("raw"))
                        .and_then(serde_json::Value::as_f64),
                })
                .collect(),
        })
        .collect();

    Ok((profile, income_statement))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "quoteSummary": {
            "result": [{
                "price": {
                    "shortName": "International Business Machines",
                    "longName": "International Business Machines Corporation",
                    "market": "us_market",
                    "marketCap": {"raw": 170000000000.0, "fmt": "170B"}
                },
                "summaryProfile": {
                    "address1": "One New Orchard Road",
                    "city": "Armonk",
                    "state": "NY",
                    "zip": "10504",
                    "country": "United States",
                    "phone": "914 499 1900",
                    "website": "https://www.ibm.com",
                    "sector": "Technology",
                    "industry": "Information Technology Services",
                    "longBusinessSummary": "IBM provides integrated solutions."
                },
                "incomeStatementHistoryQuarterly": {
                    "incomeStatementHistory": [{
                        "endDate": {"raw": 1735603200, "fmt": "2024-12-31"},
                        "totalRevenue": {"raw": 17553000000.0},
                        "netIncome": {"raw": 2870000000.0}
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_profile_from_allow_list_only() {
        let (profile, _) = parse_quote_summary(SAMPLE).unwrap();
        assert_eq!(profile.city.as_deref(), Some("Armonk"));
        assert_eq!(profile.sector.as_deref(), Some("Technology"));
        assert_eq!(profile.market.as_deref(), Some("us_market"));
        assert_eq!(profile.market_cap, Some(170_000_000_000.0));

        // Keys outside the allow-list (address1, longBusinessSummary)
        // never survive projection.
        let json = serde_json::to_value(&profile).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert!(!keys.contains(&"address1"));
        assert!(!keys.contains(&"long_business_summary"));
    }

    #[test]
    fn absent_profile_fields_are_omitted_not_defaulted() {
        let body = r#"{"quoteSummary": {"result": [{"price": {"shortName": "Acme"}}]}}"#;
        let (profile, _) = parse_quote_summary(body).unwrap();
        assert_eq!(profile.short_name.as_deref(), Some("Acme"));
        assert!(profile.sector.is_none());

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn parses_quarterly_income_statement_lines() {
        let (_, statement) = parse_quote_summary(SAMPLE).unwrap();
        assert_eq!(statement.len(), 1);
        assert_eq!(statement[0].end_date, "2024-12-31");

        let revenue = statement[0]
            .lines
            .iter()
            .find(|line| line.label == "Total Revenue")
            .unwrap();
        assert_eq!(revenue.value, Some(17_553_000_000.0));

        let ebit = statement[0].lines.iter().find(|line| line.label == "EBIT").unwrap();
        assert!(ebit.value.is_none());
    }

    #[test]
    fn empty_result_yields_empty_profile() {
        let body = r#"{"quoteSummary": {"result": null, "error": null}}"#;
        let (profile, statement) = parse_quote_summary(body).unwrap();
        assert!(profile.is_empty());
        assert!(statement.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn fetches_live_record() {
        let provider = YahooProvider::new();
        let record = provider.fetch_record("AAPL").await.unwrap();
        assert_eq!(record.symbol, "AAPL");
        assert!(!record.closes.is_empty());
    }
}
