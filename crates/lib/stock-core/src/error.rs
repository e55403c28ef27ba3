use std::error::Error;
use std::fmt;

/// Failure taxonomy for market-data operations.
///
/// `NotFound` and `EmptyProfile` carry the normalized symbol so the
/// adapter layer can surface it in user-visible error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    Provider(String),
    NotFound(String),
    EmptyProfile(String),
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(message) => write!(f, "provider error: {message}"),
            Self::NotFound(symbol) => write!(f, "no data found for ticker {symbol}"),
            Self::EmptyProfile(symbol) => {
                write!(f, "no company information found for ticker {symbol}")
            }
        }
    }
}

impl Error for MarketError {}

pub type MarketResult<T> = Result<T, MarketError>;
