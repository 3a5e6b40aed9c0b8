//! Core domain logic for the DormDash moving service: quote pricing,
//! promotions, wallet settlement, booking records and the file-backed
//! account store.
//!
//! The crate is synchronous and IO-free except for [`AccountStore`] and
//! [`Wallet::export_csv`]. All monetary values are integer-cents
//! [`Money`]; conversions from text happen once, at the parse boundary.

mod account;
mod bookings;
mod error;
mod money;
mod pricing;
mod promos;
mod store;
mod wallet;

pub use account::{Account, Profile, SavedPlace};
pub use bookings::{Booking, BookingDraft, BookingLog, BookingStatus, RECENT_CAP};
pub use error::EngineError;
pub use money::Money;
pub use pricing::{GeoPoint, MoveConfig, SupplyItem, Vehicle, HELPER_RATE, MAX_HELPERS};
pub use promos::{AppliedPromo, PromoEngine, PromoKind, Promotion, CATALOG};
pub use store::AccountStore;
pub use wallet::{
    Card, CardBrand, CardDetails, MonthStats, PaymentRequest, Settlement, Transaction, Wallet,
};

type ResultEngine<T> = Result<T, EngineError>;
