//! Domain models stored in the key-value store

pub mod booking;
pub mod listing;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use listing::{ExploreSections, Host, Listing, ListingFilter, ListingView};
pub use user::{UserProfile, UserRecord};
