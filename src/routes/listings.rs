//! Listing route handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::Session;
use crate::db;
use crate::error::Result;
use crate::models::{ExploreSections, Listing, ListingFilter, ListingView};
use crate::pricing::{stay_nights, Country, Quote, QuoteBuilder, StayRequest};
use crate::AppState;

/// Viewer's display country; unknown or missing means USD
#[derive(Debug, Deserialize)]
pub struct DisplayQuery {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedRequest {
    pub listings: Vec<Listing>,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ExploreResponse {
    pub budget: Vec<ListingView>,
    pub luxury: Vec<ListingView>,
}

fn view(pricing: &QuoteBuilder, listing: Listing, country: &Country) -> Result<ListingView> {
    let display_price = pricing.convert_price(listing.price, country)?;
    Ok(ListingView {
        listing,
        display_price,
    })
}

fn views(
    pricing: &QuoteBuilder,
    listings: Vec<Listing>,
    country: &Country,
) -> Result<Vec<ListingView>> {
    listings
        .into_iter()
        .map(|l| view(pricing, l, country))
        .collect()
}

/// All listings, priced for the viewer
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<DisplayQuery>,
) -> Result<Json<Vec<ListingView>>> {
    let country = state.pricing.country_or_base(query.country.as_deref());
    let listings = db::get_listings(state.store.as_ref()).await?;
    Ok(Json(views(&state.pricing, listings, country)?))
}

/// Filter on USD price, country, capacity and amenities
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<DisplayQuery>,
    Json(filter): Json<ListingFilter>,
) -> Result<Json<Vec<ListingView>>> {
    let country = state.pricing.country_or_base(query.country.as_deref());
    let listings = db::search_listings(state.store.as_ref(), &filter).await?;
    Ok(Json(views(&state.pricing, listings, country)?))
}

/// Budget and luxury sections for the explore page
pub async fn explore(
    State(state): State<AppState>,
    Query(query): Query<DisplayQuery>,
) -> Result<Json<ExploreResponse>> {
    let country = state.pricing.country_or_base(query.country.as_deref());
    let sections = ExploreSections::from_listings(db::get_listings(state.store.as_ref()).await?);
    Ok(Json(ExploreResponse {
        budget: views(&state.pricing, sections.budget, country)?,
        luxury: views(&state.pricing, sections.luxury, country)?,
    }))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DisplayQuery>,
) -> Result<Json<ListingView>> {
    let country = state.pricing.country_or_base(query.country.as_deref());
    let listing = db::get_listing(state.store.as_ref(), &id).await?;
    Ok(Json(view(&state.pricing, listing, country)?))
}

/// Booking panel quote for the picked dates
pub async fn quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<Quote>> {
    let listing = db::get_listing(state.store.as_ref(), &id).await?;
    let stay = StayRequest {
        nightly_price_usd: listing.price,
        nights: stay_nights(query.check_in, query.check_out)?,
        guest_country: query
            .country
            .unwrap_or_else(|| state.pricing.countries().base().code.clone()),
    };
    Ok(Json(state.pricing.build_quote_or_default(&stay)?))
}

/// Replace the catalog
pub async fn seed(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<SeedRequest>,
) -> Result<Json<SeedResponse>> {
    let count = db::seed_listings(state.store.as_ref(), &req.listings).await?;
    info!("Catalog replaced with {} listings by {}", count, session.email);
    Ok(Json(SeedResponse { count }))
}
