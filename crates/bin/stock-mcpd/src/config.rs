use clap::{Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use stock_store::schema::{DB_NAME, DB_NAMESPACE, DB_PATH};

const DEFAULT_CACHE_CAPACITY: usize = 128;
const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
const DEFAULT_RETRY_DELAY_SECS: u64 = 1;
const DEFAULT_LOG_FILE: &str = "stock_server.log";
const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";

#[derive(Parser, Debug)]
#[command(name = "stock-mcpd", version, about = "Stock MCP daemon.")]
#[allow(clippy::struct_excessive_bools)]
struct CliArgs {
    #[arg(long, env = "STOCK_DB_PATH", default_value = DB_PATH)]
    db_path: String,

    #[arg(long, env = "STOCK_DB_NAMESPACE", default_value = DB_NAMESPACE)]
    db_namespace: String,

    #[arg(long, env = "STOCK_DB_NAME", default_value = DB_NAME)]
    db_name: String,

    #[arg(
        long,
        env = "STOCK_DB_IN_MEMORY",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    db_in_memory: bool,

    #[arg(
        long,
        env = "STOCK_CACHE_CAPACITY",
        default_value_t = DEFAULT_CACHE_CAPACITY
    )]
    cache_capacity: usize,

    #[arg(
        long,
        env = "STOCK_RETRY_ATTEMPTS",
        default_value_t = DEFAULT_RETRY_ATTEMPTS
    )]
    retry_attempts: u32,

    #[arg(
        long,
        env = "STOCK_RETRY_DELAY_SECS",
        default_value_t = DEFAULT_RETRY_DELAY_SECS
    )]
    retry_delay_secs: u64,

    #[arg(
        long,
        env = "STOCK_RETRY_NOT_FOUND",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    retry_not_found: bool,

    #[arg(long, env = "STOCK_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    #[arg(
        long = "stdio",
        env = "STOCK_ENABLE_STDIO",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "STOCK_MCP_HTTP",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    http_serve: bool,

    #[arg(long, env = "STOCK_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(long, env = "STOCK_SEED_FILE")]
    seed_file: Option<PathBuf>,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct StockConfig {
    pub db_path: String,
    pub db_namespace: String,
    pub db_name: String,
    pub db_in_memory: bool,
    pub cache_capacity: usize,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub retry_not_found: bool,
    pub log_file: PathBuf,
    pub enable_stdio: bool,
    pub http_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl StockConfig {
    /// # Errors
    /// Returns `ConfigError` when a setting fails validation.
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for StockConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.cache_capacity == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "STOCK_CACHE_CAPACITY",
                value: args.cache_capacity.to_string(),
            });
        }
        if args.retry_attempts == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "STOCK_RETRY_ATTEMPTS",
                value: args.retry_attempts.to_string(),
            });
        }
        if args.db_namespace.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "STOCK_DB_NAMESPACE",
                value: args.db_namespace,
            });
        }
        if args.db_name.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "STOCK_DB_NAME",
                value: args.db_name,
            });
        }
        if !args.db_in_memory && args.db_path.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "STOCK_DB_PATH",
                value: args.db_path,
            });
        }

        Ok(Self {
            db_path: args.db_path,
            db_namespace: args.db_namespace,
            db_name: args.db_name,
            db_in_memory: args.db_in_memory,
            cache_capacity: args.cache_capacity,
            retry_attempts: args.retry_attempts,
            retry_delay: Duration::from_secs(args.retry_delay_secs),
            retry_not_found: args.retry_not_found,
            log_file: args.log_file,
            enable_stdio: args.enable_stdio,
            http_serve: args.http_serve,
            mcp_http_addr: args.mcp_http_addr,
            seed_file: args.seed_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            db_path: DB_PATH.to_string(),
            db_namespace: DB_NAMESPACE.to_string(),
            db_name: DB_NAME.to_string(),
            db_in_memory: false,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            retry_not_found: true,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            enable_stdio: true,
            http_serve: false,
            mcp_http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            seed_file: None,
        }
    }

    #[test]
    fn defaults_match_the_documented_contract() {
        let config = StockConfig::try_from(base_args()).expect("config should parse");
        assert_eq!(config.db_path, "ticker_db");
        assert_eq!(config.cache_capacity, 128);
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert!(config.retry_not_found);
        assert!(config.enable_stdio);
    }

    #[test]
    fn zero_cache_capacity_is_rejected() {
        let mut args = base_args();
        args.cache_capacity = 0;
        assert!(StockConfig::try_from(args).is_err());
    }

    #[test]
    fn zero_retry_attempts_is_rejected() {
        let mut args = base_args();
        args.retry_attempts = 0;
        assert!(StockConfig::try_from(args).is_err());
    }

    #[test]
    fn empty_db_path_is_allowed_only_in_memory() {
        let mut args = base_args();
        args.db_path = String::new();
        assert!(StockConfig::try_from(args).is_err());

        let mut args = base_args();
        args.db_path = String::new();
        args.db_in_memory = true;
        assert!(StockConfig::try_from(args).is_ok());
    }
}
