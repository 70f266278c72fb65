//! Booking models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::Gateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// A guest's booking. The amounts are a snapshot of the quote shown at
/// checkout, kept so the charge matches what the guest agreed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub listing_id: String,
    pub listing_title: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub nights: i32,
    pub total_usd: Decimal,
    pub currency_code: String,
    pub country_code: String,
    pub display_total: i64,
    pub gateway: Gateway,
    pub status: BookingStatus,
    #[serde(default)]
    pub payment_reference: Option<String>,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_pending(&self) -> bool {
        self.status == BookingStatus::Pending
    }
}
