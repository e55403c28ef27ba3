pub const TABLE_TICKER: &str = "ticker";

pub const DB_NAMESPACE: &str = "stock";
pub const DB_NAME: &str = "stock_tickers";
pub const DB_PATH: &str = "ticker_db";

/// Dimension of stored and query embeddings. Index and query space
/// must agree, so every writer and reader goes through this constant.
pub const EMBEDDING_DIM: usize = 256;

#[must_use]
pub fn make_label(symbol: &str, name: &str) -> String {
    format!("{symbol} - {name}")
}
