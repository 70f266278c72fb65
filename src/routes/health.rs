//! Health check

use axum::{extract::State, Json};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::db;
use crate::error::Result;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub listings: usize,
    pub countries: usize,
    pub cache: CacheStats,
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let listings = db::get_listings(state.store.as_ref()).await?.len();
    Ok(Json(HealthResponse {
        status: "ok",
        listings,
        countries: state.pricing.countries().len(),
        cache: state.sessions.stats(),
    }))
}
