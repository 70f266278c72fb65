//! Payment providers and the checkout flow around them.
//!
//! Providers sit behind `PaymentProvider`. The sandbox implementation keeps
//! charges in memory and settles them on verification, standing in for the
//! Stripe and Paystack HTTP APIs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::db::{self, KvStore};
use crate::error::{AppError, Result};
use crate::models::{Booking, BookingStatus};
use crate::pricing::{minor_units, Gateway};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("{gateway} rejected amount {amount_minor}: must be positive")]
    InvalidAmount { gateway: Gateway, amount_minor: i64 },

    #[error("{gateway} has no charge with reference {reference}")]
    UnknownReference { gateway: Gateway, reference: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Charge to open with a provider. Amounts are in the currency's minor unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub booking_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub email: String,
}

/// What the client needs to complete the payment with the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentInit {
    pub gateway: Gateway,
    pub reference: String,
    pub amount_minor: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
}

type ProviderResult<T> = std::result::Result<T, PaymentError>;

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn gateway(&self) -> Gateway;

    /// Open a charge with the provider
    async fn initialize(&self, charge: ChargeRequest) -> ProviderResult<PaymentInit>;

    /// Ask the provider how a charge ended
    async fn verify(&self, reference: &str) -> ProviderResult<PaymentStatus>;
}

#[derive(Debug, Clone)]
struct SandboxCharge {
    booking_id: Uuid,
    status: PaymentStatus,
}

/// In-memory provider. Charges settle to `outcome` when verified.
#[derive(Debug)]
pub struct SandboxProvider {
    gateway: Gateway,
    outcome: PaymentStatus,
    charges: RwLock<HashMap<String, SandboxCharge>>,
}

impl SandboxProvider {
    pub fn new(gateway: Gateway) -> Self {
        Self::with_outcome(gateway, PaymentStatus::Succeeded)
    }

    pub fn with_outcome(gateway: Gateway, outcome: PaymentStatus) -> Self {
        Self {
            gateway,
            outcome,
            charges: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub(crate) async fn charge_count(&self) -> usize {
        self.charges.read().await.len()
    }
}

#[async_trait]
impl PaymentProvider for SandboxProvider {
    fn gateway(&self) -> Gateway {
        self.gateway
    }

    async fn initialize(&self, charge: ChargeRequest) -> ProviderResult<PaymentInit> {
        if charge.amount_minor <= 0 {
            return Err(PaymentError::InvalidAmount {
                gateway: self.gateway,
                amount_minor: charge.amount_minor,
            });
        }

        let id = Uuid::new_v4().simple().to_string();
        let (reference, client_secret, authorization_url) = match self.gateway {
            Gateway::Stripe => {
                let reference = format!("pi_{}", id);
                let secret = format!("{}_secret_{}", reference, &id[..8]);
                (reference, Some(secret), None)
            }
            Gateway::Paystack => {
                let reference = format!("ps_{}", id);
                let url = format!("https://checkout.paystack.com/{}", reference);
                (reference, None, Some(url))
            }
        };

        self.charges.write().await.insert(
            reference.clone(),
            SandboxCharge {
                booking_id: charge.booking_id,
                status: PaymentStatus::Pending,
            },
        );

        Ok(PaymentInit {
            gateway: self.gateway,
            reference,
            amount_minor: charge.amount_minor,
            currency: charge.currency,
            client_secret,
            authorization_url,
        })
    }

    async fn verify(&self, reference: &str) -> ProviderResult<PaymentStatus> {
        let mut charges = self.charges.write().await;
        let charge = charges
            .get_mut(reference)
            .ok_or_else(|| PaymentError::UnknownReference {
                gateway: self.gateway,
                reference: reference.to_string(),
            })?;
        if charge.status == PaymentStatus::Pending {
            charge.status = self.outcome;
        }
        tracing::debug!(
            "{} sandbox charge {} for booking {} is {:?}",
            self.gateway,
            reference,
            charge.booking_id,
            charge.status
        );
        Ok(charge.status)
    }
}

/// One provider per gateway
#[derive(Clone)]
pub struct Payments {
    stripe: Arc<dyn PaymentProvider>,
    paystack: Arc<dyn PaymentProvider>,
}

impl Payments {
    pub fn new(stripe: Arc<dyn PaymentProvider>, paystack: Arc<dyn PaymentProvider>) -> Self {
        Self { stripe, paystack }
    }

    pub fn sandbox() -> Self {
        Self::new(
            Arc::new(SandboxProvider::new(Gateway::Stripe)),
            Arc::new(SandboxProvider::new(Gateway::Paystack)),
        )
    }

    pub fn provider(&self, gateway: Gateway) -> &dyn PaymentProvider {
        match gateway {
            Gateway::Stripe => self.stripe.as_ref(),
            Gateway::Paystack => self.paystack.as_ref(),
        }
    }
}

/// Open a charge for a pending booking with the gateway chosen at booking time
pub async fn initialize_payment(
    store: &dyn KvStore,
    payments: &Payments,
    user_id: Uuid,
    email: &str,
    booking_id: Uuid,
) -> Result<PaymentInit> {
    let booking = db::get_booking(store, user_id, booking_id).await?;
    if !booking.is_pending() {
        return Err(AppError::Conflict(format!(
            "Booking {} is already {:?}",
            booking.id, booking.status
        )));
    }

    let charge = ChargeRequest {
        booking_id,
        amount_minor: minor_units(booking.display_total)?,
        currency: booking.currency_code.clone(),
        email: email.to_string(),
    };
    let init = payments.provider(booking.gateway).initialize(charge).await?;

    let reference = init.reference.clone();
    db::update_booking(store, user_id, booking_id, |b| {
        b.payment_reference = Some(reference);
        Ok(())
    })
    .await?;

    info!(
        "Opened {} charge {} for booking {} ({} {})",
        init.gateway, init.reference, booking_id, init.amount_minor, init.currency
    );
    Ok(init)
}

/// Check a charge with its provider and move the booking on accordingly
pub async fn verify_payment(
    store: &dyn KvStore,
    payments: &Payments,
    user_id: Uuid,
    booking_id: Uuid,
    reference: &str,
) -> Result<Booking> {
    let booking = db::get_booking(store, user_id, booking_id).await?;
    if !booking.is_pending() {
        return Err(AppError::Conflict(format!(
            "Booking {} is already {:?}",
            booking.id, booking.status
        )));
    }
    if booking.payment_reference.as_deref() != Some(reference) {
        return Err(AppError::BadRequest(format!(
            "Reference {} does not belong to booking {}",
            reference, booking_id
        )));
    }

    let status = payments.provider(booking.gateway).verify(reference).await?;
    let next = match status {
        PaymentStatus::Succeeded => BookingStatus::Confirmed,
        PaymentStatus::Failed => BookingStatus::Cancelled,
        PaymentStatus::Pending => return Ok(booking),
    };

    // The booking may have been cancelled while the provider was asked
    let updated = db::update_booking(store, user_id, booking_id, |b| {
        if !b.is_pending() {
            return Err(AppError::Conflict(format!(
                "Booking {} was {:?} before payment settled",
                b.id, b.status
            )));
        }
        b.status = next;
        Ok(())
    })
    .await?;
    info!("Booking {} is now {:?} after {} payment", booking_id, next, booking.gateway);
    Ok(updated)
}
