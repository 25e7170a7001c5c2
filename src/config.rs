//! Environment-driven configuration.
//!
//! Unlike a TOML-configured service, the venue credentials and tunables
//! here come entirely from the process environment (`.env` via `dotenvy`,
//! then `std::env`), matching the upstream bot this crate generalizes.

use std::collections::HashMap;
use std::env;

use rust_decimal::Decimal;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::domain::Currency;
use crate::error::{Error, Result};

/// Logging configuration, initialized once at startup.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Per-venue API credentials.
#[derive(Debug, Clone, Default)]
pub struct ExchangeCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: Option<String>,
}

/// Database connection parameters for the external relational store.
/// Consumed only to build a connection string for `PersistenceBackend`
/// implementations that want one; the crate's own `SqlitePersistence`
/// ignores these in favor of a file path (see DESIGN.md).
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Top-level engine configuration, assembled from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub binance: ExchangeCredentials,
    pub kraken: ExchangeCredentials,
    pub dry_run: bool,
    pub currencies: Vec<Currency>,
    pub min_profit: Decimal,
    /// Per-trade-currency base whitelist, parsed from `ARBY_CURRENCY_BASES`.
    /// Empty means "no restriction".
    pub currency_bases: HashMap<Currency, Vec<Currency>>,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// SQLite file path (or `:memory:`) the default `PersistenceBackend`
    /// opens, from `ARBY_DATABASE_PATH`.
    pub database_path: String,
    /// Where the running engine writes its `StatusFile`, from
    /// `ARBY_STATUS_PATH`. Read back by `arby status`.
    pub status_path: String,
}

const DEFAULT_CURRENCIES: &str = "ETH,BTC,XLM,XRP,ADA";
const DEFAULT_MIN_PROFIT: &str = "0.001";
const DEFAULT_DATABASE_PATH: &str = "arby.sqlite3";
const DEFAULT_STATUS_PATH: &str = "arby-status.json";

impl Config {
    /// Load configuration from the process environment. Loads a `.env`
    /// file first if present; a missing file is not an error.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let binance = ExchangeCredentials {
            api_key: env::var("BINANCE_API_KEY").unwrap_or_default(),
            api_secret: env::var("BINANCE_API_SECRET").unwrap_or_default(),
            api_base_url: env::var("BINANCE_API_BASE_URL").ok(),
        };
        let kraken = ExchangeCredentials {
            api_key: env::var("KRAKEN_API_KEY").unwrap_or_default(),
            api_secret: env::var("KRAKEN_API_SECRET").unwrap_or_default(),
            api_base_url: None,
        };

        let dry_run = env::var("ARBY_DRY_RUN")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let currencies_raw =
            env::var("ARBY_CURRENCIES").unwrap_or_else(|_| DEFAULT_CURRENCIES.to_string());
        let currencies = parse_currency_list(&currencies_raw)?;

        let min_profit_raw =
            env::var("ARBY_MIN_PROFIT").unwrap_or_else(|_| DEFAULT_MIN_PROFIT.to_string());
        let min_profit: Decimal = min_profit_raw
            .parse()
            .map_err(|_| Error::Config(format!("invalid ARBY_MIN_PROFIT: {min_profit_raw}")))?;

        let currency_bases = match env::var("ARBY_CURRENCY_BASES") {
            Ok(raw) => parse_currency_bases(&raw)?,
            Err(_) => HashMap::new(),
        };

        let database = DatabaseConfig {
            host: env::var("DB_HOST").ok(),
            port: env::var("DB_PORT").ok().and_then(|p| p.parse().ok()),
            user: env::var("DB_USER").ok(),
            password: env::var("DB_PASSWORD").ok(),
            name: env::var("DB_NAME").ok(),
        };

        let database_path =
            env::var("ARBY_DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());
        let status_path =
            env::var("ARBY_STATUS_PATH").unwrap_or_else(|_| DEFAULT_STATUS_PATH.to_string());

        Ok(Self {
            binance,
            kraken,
            dry_run,
            currencies,
            min_profit,
            currency_bases,
            database,
            logging: LoggingConfig::default(),
            database_path,
            status_path,
        })
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn parse_currency_list(raw: &str) -> Result<Vec<Currency>> {
    let currencies: Vec<Currency> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Currency::new)
        .collect();
    if currencies.is_empty() {
        return Err(Error::Config(
            "ARBY_CURRENCIES resolved to no currencies".into(),
        ));
    }
    Ok(currencies)
}

/// Parse `"TRADE:BASE,BASE;TRADE:BASE"` into a per-trade base whitelist.
fn parse_currency_bases(raw: &str) -> Result<HashMap<Currency, Vec<Currency>>> {
    let mut out = HashMap::new();
    for entry in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (trade, bases) = entry.split_once(':').ok_or_else(|| {
            Error::Config(format!("malformed ARBY_CURRENCY_BASES entry: {entry}"))
        })?;
        let trade = Currency::new(trade.trim());
        let bases: Vec<Currency> = bases
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Currency::new)
            .collect();
        out.insert(trade, bases);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_currency_list_splits_and_trims() {
        let list = parse_currency_list(" ETH, BTC ,XRP").unwrap();
        assert_eq!(
            list,
            vec![Currency::new("ETH"), Currency::new("BTC"), Currency::new("XRP")]
        );
    }

    #[test]
    fn parse_currency_list_rejects_empty() {
        assert!(parse_currency_list("").is_err());
    }

    #[test]
    fn parse_currency_bases_single_entry() {
        let map = parse_currency_bases("XLM:BTC,ETH").unwrap();
        assert_eq!(
            map.get(&Currency::new("XLM")).unwrap(),
            &vec![Currency::new("BTC"), Currency::new("ETH")]
        );
    }

    #[test]
    fn parse_currency_bases_multiple_entries() {
        let map = parse_currency_bases("XLM:BTC;XRP:BTC,ETH").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&Currency::new("XRP")).unwrap().len(), 2);
    }

    #[test]
    fn parse_currency_bases_rejects_malformed() {
        assert!(parse_currency_bases("XLM-BTC").is_err());
    }
}
