//! Account records: profile, saved places and the per-account wallet and
//! booking log.

use serde::{Deserialize, Serialize};

use crate::{BookingLog, Wallet};

/// A labeled address the user can refer to by name or index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedPlace {
    pub label: String,
    pub address: String,
}

/// Contact details captured at sign-up.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// A stored account. Wallet and booking log default to empty so records
/// written by older versions still deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub profile: Profile,
    #[serde(default)]
    pub saved_places: Vec<SavedPlace>,
    #[serde(default)]
    pub wallet: Wallet,
    #[serde(default)]
    pub bookings: BookingLog,
}
