//! Booking route handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::cache::Session;
use crate::db;
use crate::error::{AppError, Result};
use crate::models::{Booking, BookingStatus};
use crate::pricing::{stay_nights, StayRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub listing_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default = "default_guests")]
    pub guests: u32,
}

fn default_guests() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct BookingsResponse {
    pub bookings: Vec<Booking>,
}

pub async fn list(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<BookingsResponse>> {
    let bookings = db::get_bookings(state.store.as_ref(), session.user_id).await?;
    Ok(Json(BookingsResponse { bookings }))
}

/// Create a pending booking priced in the guest's profile currency
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<Booking>> {
    let store = state.store.as_ref();
    let listing = db::get_listing(store, &req.listing_id).await?;

    if req.guests == 0 || req.guests > listing.guests {
        return Err(AppError::BadRequest(format!(
            "{} hosts 1 to {} guests",
            listing.title, listing.guests
        )));
    }
    let nights = stay_nights(req.check_in, req.check_out)?;
    if nights == 0 {
        return Err(AppError::BadRequest(
            "Check-out must be after check-in".to_string(),
        ));
    }

    let user = auth::current_user(store, &session).await?;
    let quote = state.pricing.build_quote_or_default(&StayRequest {
        nightly_price_usd: listing.price,
        nights,
        guest_country: user.country_code,
    })?;

    let shown_total = quote.display_total.to_string();
    let booking = Booking {
        id: Uuid::new_v4(),
        user_id: session.user_id,
        listing_id: listing.id,
        listing_title: listing.title,
        check_in: req.check_in,
        check_out: req.check_out,
        guests: req.guests,
        nights: quote.nights,
        total_usd: quote.total_usd,
        currency_code: quote.display_currency,
        country_code: quote.country_code,
        display_total: quote.display_total.amount,
        gateway: quote.gateway,
        status: BookingStatus::Pending,
        payment_reference: None,
        booked_at: Utc::now(),
    };
    let booking = db::insert_booking(store, booking).await?;
    info!(
        "Booking {} created: {} nights, {} ({}) via {}",
        booking.id, booking.nights, shown_total, booking.currency_code, booking.gateway
    );
    Ok(Json(booking))
}

/// Cancel a booking that has not been paid
pub async fn cancel(
    State(state): State<AppState>,
    session: Session,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = db::update_booking(state.store.as_ref(), session.user_id, booking_id, |b| {
        match b.status {
            BookingStatus::Pending => {
                b.status = BookingStatus::Cancelled;
                Ok(())
            }
            BookingStatus::Cancelled => Ok(()),
            BookingStatus::Confirmed => Err(AppError::Conflict(format!(
                "Booking {} is already paid",
                b.id
            ))),
        }
    })
    .await?;
    Ok(Json(booking))
}
