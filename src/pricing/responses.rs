//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::gateway::Gateway;

/// Supported country with its display currency and checkout gateway
#[derive(Debug, Serialize)]
pub struct CountryResponse {
    pub code: String,
    pub name: String,
    pub flag: String,
    pub currency_code: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub exchange_rate_to_usd: Decimal,
    pub symbol: String,
    pub gateway: Gateway,
}

/// Response for gateway selection
#[derive(Debug, Serialize)]
pub struct GatewayResponse {
    pub country_code: String,
    pub gateway: Gateway,
}
