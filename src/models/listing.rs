//! Rental listing models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::DisplayAmount;

/// Listings at or above this nightly USD price count as luxury.
pub const LUXURY_THRESHOLD_USD: Decimal = rust_decimal_macros::dec!(400);

/// Host shown on a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    pub joined_date: String,
}

/// Rental listing as stored. `price` is the canonical nightly price in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub location: String,
    pub country_code: String,
    pub price: Decimal,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub images: Vec<String>,
    pub guests: u32,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub host: Host,
}

impl Listing {
    /// Check the stored invariants: an id and a positive USD price
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("listing id must not be empty".to_string());
        }
        if self.price <= Decimal::ZERO {
            return Err(format!(
                "listing {} price must be positive, got {}",
                self.id, self.price
            ));
        }
        Ok(())
    }

    pub fn has_amenities(&self, required: &[String]) -> bool {
        required.iter().all(|a| self.amenities.contains(a))
    }

    pub fn is_luxury(&self) -> bool {
        self.price >= LUXURY_THRESHOLD_USD
    }
}

/// Search filter. Price bounds are USD and inclusive, whatever currency the
/// viewer browses in.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingFilter {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub guests: Option<u32>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(country) = &self.country {
            if !listing.country_code.eq_ignore_ascii_case(country) {
                return false;
            }
        }
        if matches!(self.min_price, Some(min) if listing.price < min) {
            return false;
        }
        if matches!(self.max_price, Some(max) if listing.price > max) {
            return false;
        }
        if matches!(self.guests, Some(guests) if listing.guests < guests) {
            return false;
        }
        listing.has_amenities(&self.amenities)
    }
}

/// Explore page split: budget cheapest first, luxury most expensive first.
#[derive(Debug, Clone, Default)]
pub struct ExploreSections {
    pub budget: Vec<Listing>,
    pub luxury: Vec<Listing>,
}

impl ExploreSections {
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let (mut luxury, mut budget): (Vec<_>, Vec<_>) =
            listings.into_iter().partition(Listing::is_luxury);
        budget.sort_by(|a, b| a.price.cmp(&b.price));
        luxury.sort_by(|a, b| b.price.cmp(&a.price));
        Self { budget, luxury }
    }
}

/// Listing decorated with its nightly price in the viewer's currency
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub display_price: DisplayAmount,
}
