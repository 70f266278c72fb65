//! HTTP routes for the pricing engine.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::AppState;

use super::calculators::DisplayAmount;
use super::requests::{ConvertPriceRequest, QuoteRequest};
use super::responses::{CountryResponse, GatewayResponse};
use super::services::{Quote, StayRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/countries", get(countries))
        .route("/convert", post(convert))
        .route("/quote", post(quote))
        .route("/gateway/:country", get(gateway))
}

/// Supported display countries, in configuration order
async fn countries(State(state): State<AppState>) -> Json<Vec<CountryResponse>> {
    let pricing = &state.pricing;
    let countries = pricing
        .countries()
        .iter()
        .map(|c| CountryResponse {
            code: c.code.clone(),
            name: c.name.clone(),
            flag: c.flag.clone(),
            currency_code: c.currency.code.clone(),
            exchange_rate_to_usd: c.currency.exchange_rate_to_usd,
            symbol: pricing.symbol_for(&c.currency.code),
            gateway: pricing.select_gateway(&c.code),
        })
        .collect();
    Json(countries)
}

/// Convert a USD amount. Unknown countries are a 422 here, not a fallback.
async fn convert(
    State(state): State<AppState>,
    Json(req): Json<ConvertPriceRequest>,
) -> Result<Json<DisplayAmount>> {
    let country = state.pricing.country(&req.country)?;
    Ok(Json(state.pricing.convert_price(req.amount_usd, country)?))
}

async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<Quote>> {
    let stay = StayRequest::from(req);
    Ok(Json(state.pricing.build_quote_or_default(&stay)?))
}

async fn gateway(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Json<GatewayResponse> {
    Json(GatewayResponse {
        gateway: state.pricing.select_gateway(&country),
        country_code: country.trim().to_uppercase(),
    })
}
