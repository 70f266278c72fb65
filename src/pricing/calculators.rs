//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no store access, no clocks.
//! Every caller that shows a price (listing cards, detail pages, the booking
//! panel) goes through `convert_price` so conversions never drift apart.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::models::{Country, SymbolTable};
use super::services::PricingError;

/// Service fee charged on top of the nightly subtotal.
pub const DEFAULT_SERVICE_FEE_RATE: Decimal = dec!(0.12);

/// Round to a whole display unit, halves away from zero.
///
/// Display amounts are never negative, so this is plain half-up rounding,
/// the same result a guest sees from a browser's `Math.round`.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use abrental_web::pricing::round_display;
///
/// assert_eq!(round_display(dec!(2.5)), Ok(3));
/// assert_eq!(round_display(dec!(3.5)), Ok(4));
/// assert_eq!(round_display(dec!(228.31)), Ok(228));
/// assert!(round_display(dec!(100000000000000000000)).is_err());
/// ```
pub fn round_display(amount: Decimal) -> Result<i64, PricingError> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| {
            PricingError::InvalidArgument(format!("{} does not fit a display amount", amount))
        })
}

/// Whole display units to the currency's minor unit (cents, kobo, pesewas).
pub fn minor_units(display_amount: i64) -> Result<i64, PricingError> {
    display_amount.checked_mul(100).ok_or_else(|| {
        PricingError::InvalidArgument(format!("{} overflows in minor units", display_amount))
    })
}

/// A price converted into a guest's display currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayAmount {
    pub amount: i64,
    pub currency_code: String,
    pub symbol: String,
}

impl std::fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.symbol, self.amount)
    }
}

/// Convert a canonical USD amount into the currency of `country`.
pub fn convert_price(
    amount_usd: Decimal,
    country: &Country,
    symbols: &SymbolTable,
) -> Result<DisplayAmount, PricingError> {
    if amount_usd < Decimal::ZERO {
        return Err(PricingError::InvalidArgument(format!(
            "amount must be non-negative, got {}",
            amount_usd
        )));
    }

    let rate = country.currency.exchange_rate_to_usd;
    if rate <= Decimal::ZERO {
        return Err(PricingError::InvalidArgument(format!(
            "exchange rate for {} must be positive, got {}",
            country.currency.code, rate
        )));
    }

    let converted = amount_usd.checked_mul(rate).ok_or_else(|| {
        PricingError::InvalidArgument(format!("{} USD overflows at rate {}", amount_usd, rate))
    })?;

    Ok(DisplayAmount {
        amount: round_display(converted)?,
        currency_code: country.currency.code.clone(),
        symbol: symbols.symbol_for(&country.currency.code),
    })
}

/// USD cost of a stay, unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub nights: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub service_fee_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_usd: Decimal,
}

impl CostBreakdown {
    pub fn zero() -> Self {
        Self {
            nights: 0,
            subtotal_usd: Decimal::ZERO,
            service_fee_usd: Decimal::ZERO,
            total_usd: Decimal::ZERO,
        }
    }
}

/// Compute the USD cost of `nights` at `nightly_usd` plus the service fee.
///
/// Zero nights (dates not picked yet) yields an all-zero breakdown.
pub fn compute_stay_cost(
    nightly_usd: Decimal,
    nights: i32,
    service_fee_rate: Decimal,
) -> Result<CostBreakdown, PricingError> {
    if nights < 0 {
        return Err(PricingError::InvalidArgument(format!(
            "nights must be non-negative, got {}",
            nights
        )));
    }
    if nightly_usd < Decimal::ZERO {
        return Err(PricingError::InvalidArgument(format!(
            "nightly price must be non-negative, got {}",
            nightly_usd
        )));
    }
    if service_fee_rate < Decimal::ZERO {
        return Err(PricingError::InvalidArgument(format!(
            "service fee rate must be non-negative, got {}",
            service_fee_rate
        )));
    }

    if nights == 0 {
        return Ok(CostBreakdown::zero());
    }

    let overflow = || {
        PricingError::InvalidArgument(format!(
            "{} nights at {} USD overflows",
            nights, nightly_usd
        ))
    };
    let subtotal_usd = nightly_usd
        .checked_mul(Decimal::from(nights))
        .ok_or_else(overflow)?;
    let service_fee_usd = subtotal_usd
        .checked_mul(service_fee_rate)
        .ok_or_else(overflow)?;
    let total_usd = subtotal_usd
        .checked_add(service_fee_usd)
        .ok_or_else(overflow)?;

    Ok(CostBreakdown {
        nights,
        subtotal_usd,
        service_fee_usd,
        total_usd,
    })
}

/// Whole nights between check-in and check-out dates.
pub fn stay_nights(check_in: NaiveDate, check_out: NaiveDate) -> Result<i32, PricingError> {
    let days = (check_out - check_in).num_days();
    if days < 0 {
        return Err(PricingError::InvalidArgument(format!(
            "check-out {} is before check-in {}",
            check_out, check_in
        )));
    }
    i32::try_from(days)
        .map_err(|_| PricingError::InvalidArgument(format!("stay of {} nights is too long", days)))
}
