//! Startup configuration from the environment (and `.env` via dotenvy)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::pricing::{
    default_countries, Country, CountryTable, GatewayRouting, PricingError, QuoteBuilder,
    SymbolTable, DEFAULT_SERVICE_FEE_RATE,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Failed to seed listings: {0}")]
    Catalog(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub session_ttl: Duration,
    pub service_fee_rate: Decimal,
    /// Comma separated country codes routed to Paystack
    pub paystack_countries: String,
    /// `USD=$,GBP=£` style symbol overrides
    pub currency_symbols: Option<String>,
    /// JSON array of countries replacing the built-in table
    pub countries_file: Option<PathBuf>,
    pub seed_listings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            session_ttl: Duration::from_secs(24 * 60 * 60),
            service_fee_rate: DEFAULT_SERVICE_FEE_RATE,
            paystack_countries: "NG,GH,ZA,KE".to_string(),
            currency_symbols: None,
            countries_file: None,
            seed_listings: true,
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = var("HOST") {
            config.host = parse("HOST", v)?;
        }
        if let Some(v) = var("PORT") {
            config.port = parse("PORT", v)?;
        }
        if let Some(v) = var("SESSION_TTL_SECS") {
            let secs: u64 = parse("SESSION_TTL_SECS", v.clone())?;
            if secs == 0 {
                return Err(ConfigError::Invalid { key: "SESSION_TTL_SECS", value: v });
            }
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(v) = var("SERVICE_FEE_RATE") {
            let rate: Decimal = parse("SERVICE_FEE_RATE", v.clone())?;
            if rate < Decimal::ZERO {
                return Err(ConfigError::Invalid { key: "SERVICE_FEE_RATE", value: v });
            }
            config.service_fee_rate = rate;
        }
        if let Some(v) = var("PAYSTACK_COUNTRIES") {
            config.paystack_countries = v;
        }
        config.currency_symbols = var("CURRENCY_SYMBOLS");
        config.countries_file = var("COUNTRIES_FILE").map(PathBuf::from);
        if let Some(v) = var("SEED_LISTINGS") {
            config.seed_listings = parse("SEED_LISTINGS", v)?;
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    fn countries(&self) -> Result<Vec<Country>, ConfigError> {
        let Some(path) = &self.countries_file else {
            return Ok(default_countries());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })
    }

    fn symbols(&self) -> Result<SymbolTable, ConfigError> {
        let Some(list) = &self.currency_symbols else {
            return Ok(SymbolTable::default());
        };
        let mut symbols = SymbolTable::default();
        for pair in list.split(',').filter(|p| !p.trim().is_empty()) {
            let (code, symbol) = pair.split_once('=').ok_or_else(|| ConfigError::Invalid {
                key: "CURRENCY_SYMBOLS",
                value: pair.to_string(),
            })?;
            symbols.insert(code.trim(), symbol.trim());
        }
        Ok(symbols)
    }

    /// Build the pricing core from the configured tables
    pub fn quote_builder(&self) -> Result<QuoteBuilder, ConfigError> {
        let countries = CountryTable::new(self.countries()?)?;
        Ok(QuoteBuilder::new(
            countries,
            self.symbols()?,
            GatewayRouting::from_list(&self.paystack_countries),
            self.service_fee_rate,
        )?)
    }
}
