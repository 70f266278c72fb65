//! HTTP route handlers

pub mod auth;
pub mod bookings;
pub mod favorites;
pub mod health;
pub mod listings;
pub mod payments;
