//! Pricing engine module.
//!
//! Converts canonical USD prices into a guest's display currency, costs a
//! stay, and routes checkout to a payment gateway. Everything here is pure;
//! the HTTP layer lives in `routes`.

pub mod calculators;
pub mod gateway;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{
    compute_stay_cost, convert_price, minor_units, round_display, stay_nights, CostBreakdown,
    DisplayAmount, DEFAULT_SERVICE_FEE_RATE,
};
pub use gateway::{Gateway, GatewayRouting};
pub use models::{default_countries, Country, CountryTable, Currency, SymbolTable};
pub use routes::router;
pub use services::{PricingError, Quote, QuoteBuilder, StayRequest};
