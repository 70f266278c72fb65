//! A&B Rentals storefront backend.
//!
//! JSON API over a listing catalog with multi-currency pricing, favorites,
//! bookings and checkout routed to Stripe or Paystack by guest country.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod payments;
pub mod pricing;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use cache::SessionCache;
use config::{Config, ConfigError};
use db::{KvStore, MemoryStore};
use models::Listing;
use payments::Payments;
use pricing::QuoteBuilder;

/// Catalog shipped with the storefront
const DEFAULT_LISTINGS: &str = include_str!("../data/listings.json");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub sessions: SessionCache,
    pub pricing: Arc<QuoteBuilder>,
    pub payments: Payments,
}

impl AppState {
    /// Build state from configuration with the in-memory store and sandbox gateways
    pub async fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let state = Self {
            store: Arc::new(MemoryStore::new()),
            sessions: SessionCache::new(config.session_ttl),
            pricing: Arc::new(config.quote_builder()?),
            payments: Payments::sandbox(),
        };

        if config.seed_listings {
            let count = seed_default_catalog(state.store.as_ref())
                .await
                .map_err(|e| ConfigError::Catalog(e.to_string()))?;
            info!("Seeded {} listings", count);
        }

        Ok(state)
    }
}

/// Load the bundled catalog into the store
pub async fn seed_default_catalog(store: &dyn KvStore) -> error::Result<usize> {
    let listings: Vec<Listing> = serde_json::from_str(DEFAULT_LISTINGS)
        .map_err(|e| error::AppError::Internal(format!("bundled catalog is invalid: {}", e)))?;
    db::seed_listings(store, &listings).await
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/signup", post(routes::auth::sign_up))
        .route("/auth/signin", post(routes::auth::sign_in))
        .route("/auth/signout", post(routes::auth::sign_out))
        .route(
            "/auth/profile",
            get(routes::auth::profile).put(routes::auth::update_profile),
        )
        .route(
            "/listings",
            get(routes::listings::list).put(routes::listings::seed),
        )
        .route("/listings/search", post(routes::listings::search))
        .route("/listings/explore", get(routes::listings::explore))
        .route("/listings/:id", get(routes::listings::detail))
        .route("/listings/:id/quote", get(routes::listings::quote))
        .route("/favorites", get(routes::favorites::list))
        .route(
            "/favorites/:listing_id",
            post(routes::favorites::add).delete(routes::favorites::remove),
        )
        .route(
            "/bookings",
            get(routes::bookings::list).post(routes::bookings::create),
        )
        .route("/bookings/:id/cancel", post(routes::bookings::cancel))
        .route("/payments/initialize", post(routes::payments::initialize))
        .route("/payments/verify", post(routes::payments::verify))
        .nest("/pricing", pricing::router());

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
