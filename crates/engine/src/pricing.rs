//! Move configuration and price estimation.
//!
//! The estimate is a pure derivation of the current [`MoveConfig`]:
//! vehicle base rate + helpers + supplies. It is recomputed on every read
//! so callers never observe a stale total.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Money;

/// Price contribution per helper.
pub const HELPER_RATE: Money = Money::new(4_000);

/// Maximum number of helpers on a single move.
pub const MAX_HELPERS: u8 = 10;

/// Vehicle tiers with fixed base rates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vehicle {
    PickupTruck,
    Van,
    SmallBoxTruck,
    LargeBoxTruck,
    SemiLight,
}

impl Vehicle {
    /// Base rate charged for the tier, before helpers and supplies.
    #[must_use]
    pub const fn base_rate(self) -> Money {
        match self {
            Vehicle::PickupTruck | Vehicle::Van => Money::new(8_900),
            Vehicle::SmallBoxTruck => Money::new(12_000),
            Vehicle::LargeBoxTruck => Money::new(18_000),
            Vehicle::SemiLight => Money::new(25_000),
        }
    }

    /// Canonical display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Vehicle::PickupTruck => "Pickup Truck",
            Vehicle::Van => "Van",
            Vehicle::SmallBoxTruck => "Small Box Truck",
            Vehicle::LargeBoxTruck => "Large Box Truck",
            Vehicle::SemiLight => "Semi-light",
        }
    }

    /// Label with the base rate, as shown in booking summaries
    /// (e.g. `Pickup Truck ($89)`).
    #[must_use]
    pub fn labeled(self) -> String {
        format!("{} (${})", self.label(), self.base_rate().cents() / 100)
    }

    /// Normalizes a free-text vehicle name to a tier.
    ///
    /// Spacing and hyphens are ignored, so "semi light", "semi-light" and
    /// "semilight" all resolve. Returns `None` for unknown names.
    #[must_use]
    pub fn parse(text: &str) -> Option<Vehicle> {
        let t: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if t.contains("pickup") {
            Some(Vehicle::PickupTruck)
        } else if t.contains("smallbox") {
            Some(Vehicle::SmallBoxTruck)
        } else if t.contains("largebox") {
            Some(Vehicle::LargeBoxTruck)
        } else if t.contains("semi") {
            Some(Vehicle::SemiLight)
        } else if t.contains("van") {
            Some(Vehicle::Van)
        } else {
            None
        }
    }
}

/// Canonical packing-supply catalog.
///
/// The furniture entries are quick-add items carried on the cart for the
/// movers' benefit; they do not affect the price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyItem {
    SmallBox,
    MediumBox,
    LargeBox,
    PackingTape,
    Desk,
    Mattress,
    Sofa,
    Tv,
    Dresser,
}

impl SupplyItem {
    /// Fixed unit price from the catalog.
    #[must_use]
    pub const fn unit_price(self) -> Money {
        match self {
            SupplyItem::SmallBox => Money::new(250),
            SupplyItem::MediumBox => Money::new(350),
            SupplyItem::LargeBox => Money::new(450),
            SupplyItem::PackingTape => Money::new(300),
            SupplyItem::Desk
            | SupplyItem::Mattress
            | SupplyItem::Sofa
            | SupplyItem::Tv
            | SupplyItem::Dresser => Money::ZERO,
        }
    }

    /// Canonical display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SupplyItem::SmallBox => "Small Box",
            SupplyItem::MediumBox => "Medium Box",
            SupplyItem::LargeBox => "Large Box",
            SupplyItem::PackingTape => "Packing Tape",
            SupplyItem::Desk => "Desk",
            SupplyItem::Mattress => "Mattress",
            SupplyItem::Sofa => "Sofa",
            SupplyItem::Tv => "TV",
            SupplyItem::Dresser => "Dresser",
        }
    }

    /// Normalizes a free-text item name to a catalog entry.
    ///
    /// A bare "box"/"boxes" resolves to [`SupplyItem::SmallBox`]; the
    /// sized variants must be spelled out. Returns `None` for anything
    /// outside the catalog.
    #[must_use]
    pub fn parse(term: &str) -> Option<SupplyItem> {
        let t = term.to_lowercase();
        if t.contains("small box") {
            Some(SupplyItem::SmallBox)
        } else if t.contains("medium box") {
            Some(SupplyItem::MediumBox)
        } else if t.contains("large box") {
            Some(SupplyItem::LargeBox)
        } else if t.contains("tape") {
            Some(SupplyItem::PackingTape)
        } else if t.contains("box") {
            Some(SupplyItem::SmallBox)
        } else if t.contains("desk") {
            Some(SupplyItem::Desk)
        } else if t.contains("mattress") {
            Some(SupplyItem::Mattress)
        } else if t.contains("sofa") || t.contains("couch") {
            Some(SupplyItem::Sofa)
        } else if t.contains("tv") {
            Some(SupplyItem::Tv)
        } else if t.contains("dresser") {
            Some(SupplyItem::Dresser)
        } else {
            None
        }
    }
}

/// A geographic coordinate pair attached to an address label.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// The move being configured by the active session.
///
/// Mutated by the UI or the assistant; read by the price engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveConfig {
    pub pickup: String,
    pub dropoff: String,
    pub pickup_coords: Option<GeoPoint>,
    pub dropoff_coords: Option<GeoPoint>,
    pub vehicle: Option<Vehicle>,
    helpers: u8,
    supplies: BTreeMap<SupplyItem, u32>,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            pickup: String::new(),
            dropoff: String::new(),
            pickup_coords: None,
            dropoff_coords: None,
            vehicle: Some(Vehicle::PickupTruck),
            helpers: 0,
            supplies: BTreeMap::new(),
        }
    }
}

impl MoveConfig {
    /// Current helper count, always in `[0, MAX_HELPERS]`.
    #[must_use]
    pub fn helpers(&self) -> u8 {
        self.helpers
    }

    /// Sets the helper count, clamping to `[0, MAX_HELPERS]`.
    pub fn set_helpers(&mut self, n: i64) -> u8 {
        self.helpers = n.clamp(0, i64::from(MAX_HELPERS)) as u8;
        self.helpers
    }

    /// Adjusts the helper count by a signed delta, clamping as
    /// [`set_helpers`](Self::set_helpers) does.
    pub fn adjust_helpers(&mut self, delta: i64) -> u8 {
        self.set_helpers(i64::from(self.helpers) + delta)
    }

    /// Adds `qty` units of a supply item to the cart.
    pub fn add_supply(&mut self, item: SupplyItem, qty: u32) {
        if qty == 0 {
            return;
        }
        *self.supplies.entry(item).or_insert(0) += qty;
    }

    /// Removes up to `qty` units of a supply item.
    ///
    /// An entry that reaches zero is deleted; the cart never stores a
    /// zero quantity.
    pub fn remove_supply(&mut self, item: SupplyItem, qty: u32) {
        let Some(current) = self.supplies.get_mut(&item) else {
            return;
        };
        *current = current.saturating_sub(qty);
        if *current == 0 {
            self.supplies.remove(&item);
        }
    }

    /// Empties the supplies cart.
    pub fn clear_supplies(&mut self) {
        self.supplies.clear();
    }

    /// The current supplies cart.
    #[must_use]
    pub fn supplies(&self) -> &BTreeMap<SupplyItem, u32> {
        &self.supplies
    }

    /// Price contribution of the helpers.
    #[must_use]
    pub fn helpers_price(&self) -> Money {
        Money::new(HELPER_RATE.cents() * i64::from(self.helpers))
    }

    /// Price contribution of the supplies cart.
    #[must_use]
    pub fn supplies_price(&self) -> Money {
        self.supplies
            .iter()
            .map(|(item, qty)| Money::new(item.unit_price().cents() * i64::from(*qty)))
            .sum()
    }

    /// Gross estimate: vehicle base + helpers + supplies.
    ///
    /// A missing vehicle contributes a base rate of 0 rather than
    /// failing. Never negative.
    #[must_use]
    pub fn estimate(&self) -> Money {
        let base = self.vehicle.map(Vehicle::base_rate).unwrap_or(Money::ZERO);
        base + self.helpers_price() + self.supplies_price()
    }

    /// Great-circle distance between pickup and dropoff, when both
    /// coordinates are known.
    #[must_use]
    pub fn distance_km(&self) -> Option<f64> {
        let (from, to) = (self.pickup_coords?, self.dropoff_coords?);
        const R: f64 = 6371.0;
        let d_lat = (to.lat - from.lat).to_radians();
        let d_lng = (to.lng - from.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        Some(R * 2.0 * a.sqrt().atan2((1.0 - a).sqrt()))
    }
}
