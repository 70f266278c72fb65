//! Request DTOs for pricing API endpoints.
//!
//! USD amounts are accepted as JSON strings (`"289.50"`) or numbers.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::services::StayRequest;

/// Request to convert a USD amount for display
#[derive(Debug, Deserialize)]
pub struct ConvertPriceRequest {
    pub amount_usd: Decimal,
    pub country: String,
}

/// Request to quote a stay from a nightly USD price
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub nightly_price_usd: Decimal,
    #[serde(default)]
    pub nights: i32,
    #[serde(default = "default_country")]
    pub guest_country: String,
}

fn default_country() -> String {
    super::models::BASE_COUNTRY.to_string()
}

impl From<QuoteRequest> for StayRequest {
    fn from(req: QuoteRequest) -> Self {
        StayRequest {
            nightly_price_usd: req.nightly_price_usd,
            nights: req.nights,
            guest_country: req.guest_country,
        }
    }
}
