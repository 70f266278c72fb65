//! Booking quote assembly.
//!
//! `QuoteBuilder` owns the static pricing configuration (country table, symbol
//! table, gateway routing, fee rate) and composes the calculators into a full
//! quote. It is built once at startup and shared read-only.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::{
    compute_stay_cost, convert_price, DisplayAmount, DEFAULT_SERVICE_FEE_RATE,
};
use super::gateway::{Gateway, GatewayRouting};
use super::models::{Country, CountryTable, SymbolTable};

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// Negative price, non-positive rate, negative night count. Caller bug.
    #[error("Invalid pricing argument: {0}")]
    InvalidArgument(String),

    /// Guest country is not in the country table. Callers fall back to USD.
    #[error("Unsupported country: {0}")]
    UnsupportedCountry(String),
}

/// A stay to be priced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayRequest {
    pub nightly_price_usd: Decimal,
    pub nights: i32,
    pub guest_country: String,
}

/// Derived cost breakdown for one stay and viewer. Never cached or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub nights: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub service_fee_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub service_fee_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_usd: Decimal,
    pub country_code: String,
    pub display_currency: String,
    pub display_nightly: DisplayAmount,
    pub display_subtotal: DisplayAmount,
    pub display_service_fee: DisplayAmount,
    pub display_total: DisplayAmount,
    pub gateway: Gateway,
}

/// Composes currency conversion, stay costing and gateway routing.
#[derive(Debug, Clone)]
pub struct QuoteBuilder {
    countries: CountryTable,
    symbols: SymbolTable,
    routing: GatewayRouting,
    service_fee_rate: Decimal,
}

impl QuoteBuilder {
    pub fn new(
        countries: CountryTable,
        symbols: SymbolTable,
        routing: GatewayRouting,
        service_fee_rate: Decimal,
    ) -> Result<Self, PricingError> {
        if service_fee_rate < Decimal::ZERO {
            return Err(PricingError::InvalidArgument(format!(
                "service fee rate must be non-negative, got {}",
                service_fee_rate
            )));
        }
        Ok(Self {
            countries,
            symbols,
            routing,
            service_fee_rate,
        })
    }

    pub fn countries(&self) -> &CountryTable {
        &self.countries
    }

    pub fn routing(&self) -> &GatewayRouting {
        &self.routing
    }

    pub fn service_fee_rate(&self) -> Decimal {
        self.service_fee_rate
    }

    /// Resolve a supported country by code.
    pub fn country(&self, code: &str) -> Result<&Country, PricingError> {
        self.countries
            .get(code)
            .ok_or_else(|| PricingError::UnsupportedCountry(code.to_string()))
    }

    /// Resolve a country, falling back to the base USD country.
    pub fn country_or_base(&self, code: Option<&str>) -> &Country {
        match code {
            Some(code) => self.countries.get(code).unwrap_or_else(|| {
                tracing::debug!("Unknown display country {}, using base currency", code);
                self.countries.base()
            }),
            None => self.countries.base(),
        }
    }

    /// Convert a USD amount for display in the given country.
    pub fn convert_price(
        &self,
        amount_usd: Decimal,
        country: &Country,
    ) -> Result<DisplayAmount, PricingError> {
        convert_price(amount_usd, country, &self.symbols)
    }

    pub fn symbol_for(&self, currency_code: &str) -> String {
        self.symbols.symbol_for(currency_code)
    }

    pub fn select_gateway(&self, country_code: &str) -> Gateway {
        self.routing.select_gateway(country_code)
    }

    /// Build a quote for a stay.
    ///
    /// Subtotal, fee and total are each converted from USD on their own, so
    /// the displayed total can differ by one unit from the sum of the
    /// displayed parts.
    pub fn build_quote(&self, stay: &StayRequest) -> Result<Quote, PricingError> {
        let country = self.country(&stay.guest_country)?;
        self.quote_for(stay, country)
    }

    /// Build a quote, pricing in USD when the guest country is unsupported.
    pub fn build_quote_or_default(&self, stay: &StayRequest) -> Result<Quote, PricingError> {
        match self.build_quote(stay) {
            Err(PricingError::UnsupportedCountry(code)) => {
                tracing::warn!(
                    "Quote requested for unsupported country {}, falling back to USD",
                    code
                );
                self.quote_for(stay, self.countries.base())
            }
            other => other,
        }
    }

    fn quote_for(&self, stay: &StayRequest, country: &Country) -> Result<Quote, PricingError> {
        let cost = compute_stay_cost(stay.nightly_price_usd, stay.nights, self.service_fee_rate)?;

        Ok(Quote {
            nights: cost.nights,
            service_fee_rate: self.service_fee_rate,
            subtotal_usd: cost.subtotal_usd,
            service_fee_usd: cost.service_fee_usd,
            total_usd: cost.total_usd,
            country_code: country.code.clone(),
            display_currency: country.currency.code.clone(),
            display_nightly: self.convert_price(stay.nightly_price_usd, country)?,
            display_subtotal: self.convert_price(cost.subtotal_usd, country)?,
            display_service_fee: self.convert_price(cost.service_fee_usd, country)?,
            display_total: self.convert_price(cost.total_usd, country)?,
            gateway: self.select_gateway(&country.code),
        })
    }
}

impl Default for QuoteBuilder {
    fn default() -> Self {
        Self {
            countries: CountryTable::default(),
            symbols: SymbolTable::default(),
            routing: GatewayRouting::default(),
            service_fee_rate: DEFAULT_SERVICE_FEE_RATE,
        }
    }
}
