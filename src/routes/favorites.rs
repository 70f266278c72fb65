//! Favorites route handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::cache::Session;
use crate::db;
use crate::error::Result;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<String>,
}

pub async fn list(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<FavoritesResponse>> {
    let favorites = db::get_favorites(state.store.as_ref(), session.user_id).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Path(listing_id): Path<String>,
) -> Result<Json<FavoritesResponse>> {
    let favorites = db::add_favorite(state.store.as_ref(), session.user_id, &listing_id).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(listing_id): Path<String>,
) -> Result<Json<FavoritesResponse>> {
    let favorites = db::remove_favorite(state.store.as_ref(), session.user_id, &listing_id).await?;
    Ok(Json(FavoritesResponse { favorites }))
}
