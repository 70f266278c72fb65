//! Payment route handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::cache::Session;
use crate::error::Result;
use crate::models::Booking;
use crate::payments::{self, PaymentInit};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct InitializePaymentRequest {
    pub booking_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub booking_id: Uuid,
    pub reference: String,
}

pub async fn initialize(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<InitializePaymentRequest>,
) -> Result<Json<PaymentInit>> {
    let init = payments::initialize_payment(
        state.store.as_ref(),
        &state.payments,
        session.user_id,
        &session.email,
        req.booking_id,
    )
    .await?;
    Ok(Json(init))
}

pub async fn verify(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<Booking>> {
    let booking = payments::verify_payment(
        state.store.as_ref(),
        &state.payments,
        session.user_id,
        req.booking_id,
        &req.reference,
    )
    .await?;
    Ok(Json(booking))
}
