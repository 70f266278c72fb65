//! Store queries for listings, favorites, bookings and accounts
//!
//! Key layout:
//! - `listings` - the whole catalog as one array
//! - `favorites:{user_id}` - array of listing ids
//! - `bookings:{user_id}` - array of bookings
//! - `user:{email}` - account record

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Booking, Listing, ListingFilter, UserRecord};

use super::kv::{KvStore, StoreError};

type Change<T, R> = (Option<T>, R);

const LISTINGS_KEY: &str = "listings";

fn favorites_key(user_id: Uuid) -> String {
    format!("favorites:{}", user_id)
}

fn bookings_key(user_id: Uuid) -> String {
    format!("bookings:{}", user_id)
}

fn user_key(email: &str) -> String {
    format!("user:{}", email.trim().to_lowercase())
}

async fn load<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| {
                StoreError::Malformed {
                    key: key.to_string(),
                    source,
                }
                .into()
            }),
        None => Ok(None),
    }
}

async fn save<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let value = serde_json::to_value(value).map_err(|source| StoreError::Malformed {
        key: key.to_string(),
        source,
    })?;
    store.set(key, value).await?;
    Ok(())
}

/// Read-modify-write of one typed value under the store's per-key update.
///
/// `change` returns the value to write back (`None` keeps the stored one) and
/// the result handed to the caller. An error from `change` writes nothing.
async fn modify<T, R, F>(store: &dyn KvStore, key: &str, change: F) -> Result<R>
where
    T: DeserializeOwned + Serialize,
    R: Send,
    F: FnOnce(Option<T>) -> Result<Change<T, R>> + Send,
{
    let mut outcome: Option<Result<R>> = None;
    let slot = &mut outcome;
    let owned_key = key.to_string();

    store
        .update(
            key,
            Box::new(move |current| {
                let malformed = |source| StoreError::Malformed {
                    key: owned_key.clone(),
                    source,
                };
                let current = current
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(malformed)?;
                match change(current) {
                    Ok((next, result)) => {
                        let next = next
                            .map(|value| serde_json::to_value(&value))
                            .transpose()
                            .map_err(malformed)?;
                        *slot = Some(Ok(result));
                        Ok(next)
                    }
                    Err(e) => {
                        *slot = Some(Err(e));
                        Ok(None)
                    }
                }
            }),
        )
        .await?;

    outcome.unwrap_or_else(|| Err(AppError::Internal(format!("update of {} did not run", key))))
}

// ========== Listings ==========

/// Get the whole catalog
pub async fn get_listings(store: &dyn KvStore) -> Result<Vec<Listing>> {
    Ok(load(store, LISTINGS_KEY).await?.unwrap_or_default())
}

/// Get a listing by id
pub async fn get_listing(store: &dyn KvStore, id: &str) -> Result<Listing> {
    get_listings(store)
        .await?
        .into_iter()
        .find(|l| l.id == id)
        .ok_or(AppError::NotFound)
}

/// Replace the catalog. Every listing must carry a positive USD price.
pub async fn seed_listings(store: &dyn KvStore, listings: &[Listing]) -> Result<usize> {
    for listing in listings {
        listing.validate().map_err(AppError::BadRequest)?;
    }
    save(store, LISTINGS_KEY, &listings).await?;
    Ok(listings.len())
}

/// Filter the catalog on canonical USD prices
pub async fn search_listings(store: &dyn KvStore, filter: &ListingFilter) -> Result<Vec<Listing>> {
    Ok(get_listings(store)
        .await?
        .into_iter()
        .filter(|l| filter.matches(l))
        .collect())
}

// ========== Favorites ==========

pub async fn get_favorites(store: &dyn KvStore, user_id: Uuid) -> Result<Vec<String>> {
    Ok(load(store, &favorites_key(user_id)).await?.unwrap_or_default())
}

/// Add a listing to a user's favorites. Adding twice is a no-op.
pub async fn add_favorite(
    store: &dyn KvStore,
    user_id: Uuid,
    listing_id: &str,
) -> Result<Vec<String>> {
    get_listing(store, listing_id).await?;

    modify(store, &favorites_key(user_id), |current: Option<Vec<String>>| {
        let mut favorites = current.unwrap_or_default();
        if favorites.iter().any(|id| id == listing_id) {
            return Ok((None, favorites));
        }
        favorites.push(listing_id.to_string());
        Ok((Some(favorites.clone()), favorites))
    })
    .await
}

pub async fn remove_favorite(
    store: &dyn KvStore,
    user_id: Uuid,
    listing_id: &str,
) -> Result<Vec<String>> {
    modify(store, &favorites_key(user_id), |current: Option<Vec<String>>| {
        let mut favorites = current.unwrap_or_default();
        favorites.retain(|id| id != listing_id);
        Ok((Some(favorites.clone()), favorites))
    })
    .await
}

// ========== Bookings ==========

pub async fn get_bookings(store: &dyn KvStore, user_id: Uuid) -> Result<Vec<Booking>> {
    Ok(load(store, &bookings_key(user_id)).await?.unwrap_or_default())
}

pub async fn get_booking(store: &dyn KvStore, user_id: Uuid, booking_id: Uuid) -> Result<Booking> {
    get_bookings(store, user_id)
        .await?
        .into_iter()
        .find(|b| b.id == booking_id)
        .ok_or(AppError::NotFound)
}

pub async fn insert_booking(store: &dyn KvStore, booking: Booking) -> Result<Booking> {
    let key = bookings_key(booking.user_id);
    modify(store, &key, |current: Option<Vec<Booking>>| {
        let mut bookings = current.unwrap_or_default();
        bookings.push(booking.clone());
        Ok((Some(bookings), booking))
    })
    .await
}

/// Apply `update` to one of a user's bookings and store the result
pub async fn update_booking<F>(
    store: &dyn KvStore,
    user_id: Uuid,
    booking_id: Uuid,
    update: F,
) -> Result<Booking>
where
    F: FnOnce(&mut Booking) -> Result<()> + Send,
{
    modify(store, &bookings_key(user_id), |current: Option<Vec<Booking>>| {
        let mut bookings = current.unwrap_or_default();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or(AppError::NotFound)?;
        update(booking)?;
        let updated = booking.clone();
        Ok((Some(bookings), updated))
    })
    .await
}

// ========== Accounts ==========

pub async fn find_user(store: &dyn KvStore, email: &str) -> Result<Option<UserRecord>> {
    load(store, &user_key(email)).await
}

/// Store a new account, refusing a duplicate email
pub async fn insert_user(store: &dyn KvStore, user: &UserRecord) -> Result<()> {
    modify(store, &user_key(&user.email), |current: Option<UserRecord>| {
        if current.is_some() {
            return Err(AppError::Conflict(format!(
                "An account already exists for {}",
                user.email
            )));
        }
        Ok((Some(user.clone()), ()))
    })
    .await
}

pub async fn save_user(store: &dyn KvStore, user: &UserRecord) -> Result<()> {
    save(store, &user_key(&user.email), user).await
}
