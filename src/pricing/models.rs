//! Currency and country reference data for pricing.
//!
//! These tables are static configuration loaded once at startup. Exchange
//! rates are snapshots, not live quotes.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::services::PricingError;

/// Code of the canonical currency every listing price is stored in.
pub const BASE_CURRENCY: &str = "USD";

/// Country whose currency is the canonical one.
pub const BASE_COUNTRY: &str = "US";

/// A display currency and its rate against USD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    /// Units of this currency per one USD.
    pub exchange_rate_to_usd: Decimal,
}

/// A country a guest can browse from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub flag: String,
    pub currency: Currency,
}

impl Country {
    pub fn new(code: &str, name: &str, flag: &str, currency: &str, rate: Decimal) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            flag: flag.to_string(),
            currency: Currency {
                code: currency.to_string(),
                exchange_rate_to_usd: rate,
            },
        }
    }
}

/// Lookup table of supported countries keyed by upper-case country code.
#[derive(Debug, Clone)]
pub struct CountryTable {
    countries: HashMap<String, Country>,
    /// Insertion order, for stable listings in API responses.
    order: Vec<String>,
}

impl CountryTable {
    /// Build a table, rejecting non-positive exchange rates and a missing base country.
    pub fn new(countries: Vec<Country>) -> Result<Self, PricingError> {
        let mut table = Self {
            countries: HashMap::with_capacity(countries.len()),
            order: Vec::with_capacity(countries.len()),
        };

        for mut country in countries {
            if country.currency.exchange_rate_to_usd <= Decimal::ZERO {
                return Err(PricingError::InvalidArgument(format!(
                    "exchange rate for {} must be positive, got {}",
                    country.currency.code, country.currency.exchange_rate_to_usd
                )));
            }
            country.code = country.code.to_uppercase();
            if !table.countries.contains_key(&country.code) {
                table.order.push(country.code.clone());
            }
            table.countries.insert(country.code.clone(), country);
        }

        match table.countries.get(BASE_COUNTRY) {
            Some(base)
                if base.currency.code == BASE_CURRENCY
                    && base.currency.exchange_rate_to_usd == Decimal::ONE =>
            {
                Ok(table)
            }
            _ => Err(PricingError::InvalidArgument(format!(
                "country table must contain {} with {} at rate 1",
                BASE_COUNTRY, BASE_CURRENCY
            ))),
        }
    }

    pub fn get(&self, code: &str) -> Option<&Country> {
        self.countries.get(&code.to_uppercase())
    }

    /// The canonical USD country, used as the fallback display currency.
    pub fn base(&self) -> &Country {
        // Presence is checked in `new`.
        &self.countries[BASE_COUNTRY]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.order.iter().filter_map(|code| self.countries.get(code))
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl Default for CountryTable {
    fn default() -> Self {
        let countries = default_countries();
        let order = countries.iter().map(|c| c.code.clone()).collect();
        Self {
            countries: countries.into_iter().map(|c| (c.code.clone(), c)).collect(),
            order,
        }
    }
}

/// Countries the storefront ships with.
pub fn default_countries() -> Vec<Country> {
    vec![
        Country::new("US", "USA", "🇺🇸", "USD", dec!(1)),
        Country::new("GB", "UK", "🇬🇧", "GBP", dec!(0.79)),
        Country::new("NG", "Nigeria", "🇳🇬", "NGN", dec!(1580)),
        Country::new("GH", "Ghana", "🇬🇭", "GHS", dec!(15.5)),
        Country::new("ZA", "South Africa", "🇿🇦", "ZAR", dec!(18.5)),
        Country::new("KE", "Kenya", "🇰🇪", "KES", dec!(129)),
    ]
}

/// Currency symbols for display. Unknown codes render as the code itself.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, String>,
}

impl SymbolTable {
    /// Add or replace the symbol for a currency code
    pub fn insert(&mut self, currency_code: &str, symbol: &str) {
        self.symbols
            .insert(currency_code.to_uppercase(), symbol.to_string());
    }

    pub fn symbol_for(&self, currency_code: &str) -> String {
        self.symbols
            .get(&currency_code.to_uppercase())
            .cloned()
            .unwrap_or_else(|| currency_code.to_string())
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        let symbols = [("USD", "$"), ("GBP", "£"), ("NGN", "₦")]
            .into_iter()
            .map(|(code, symbol)| (code.to_string(), symbol.to_string()))
            .collect();
        Self { symbols }
    }
}
