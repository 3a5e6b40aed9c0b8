//! Booking records: lifecycle status and the capped recent-bookings log.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, SupplyItem};

/// Most recent bookings retained per account.
pub const RECENT_CAP: usize = 25;

/// Lifecycle of a booking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Scheduled,
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "Scheduled",
            BookingStatus::Pending => "Pending",
            BookingStatus::Accepted => "Accepted",
            BookingStatus::InProgress => "In progress",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl TryFrom<&str> for BookingStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Scheduled" => Ok(BookingStatus::Scheduled),
            "Pending" => Ok(BookingStatus::Pending),
            "Accepted" => Ok(BookingStatus::Accepted),
            "In progress" => Ok(BookingStatus::InProgress),
            "Completed" => Ok(BookingStatus::Completed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(EngineError::KeyNotFound(other.to_string())),
        }
    }
}

/// A recorded move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub pickup: String,
    pub dropoff: String,
    pub vehicle: String,
    pub helpers: u8,
    #[serde(default)]
    pub items: BTreeMap<SupplyItem, u32>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    pub total: Money,
}

/// Input for [`BookingLog::add`]. The log assigns id and timestamp.
#[derive(Clone, Debug, Default)]
pub struct BookingDraft {
    pub status: Option<BookingStatus>,
    pub pickup: String,
    pub dropoff: String,
    pub vehicle: String,
    pub helpers: u8,
    pub items: BTreeMap<SupplyItem, u32>,
    pub distance_km: Option<f64>,
    pub total: Money,
}

/// The per-account recent-bookings log, newest first, capped at
/// [`RECENT_CAP`] entries. Older entries are evicted on insert.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingLog {
    bookings: Vec<Booking>,
}

impl BookingLog {
    /// Records a booking at the head of the log, evicting the oldest
    /// entry past the cap. Returns the stored record.
    pub fn add(&mut self, draft: BookingDraft, now: DateTime<Utc>) -> &Booking {
        let booking = Booking {
            id: Uuid::new_v4(),
            status: draft.status.unwrap_or_default(),
            created_at: now,
            pickup: draft.pickup,
            dropoff: draft.dropoff,
            vehicle: draft.vehicle,
            helpers: draft.helpers,
            items: draft.items,
            distance_km: draft.distance_km,
            total: draft.total,
        };
        self.bookings.insert(0, booking);
        self.bookings.truncate(RECENT_CAP);
        &self.bookings[0]
    }

    /// All retained bookings, newest first.
    #[must_use]
    pub fn list(&self) -> &[Booking] {
        &self.bookings
    }

    /// Sets the status of the booking with the given id.
    pub fn update_status(&mut self, id: Uuid, status: BookingStatus) -> Option<&Booking> {
        let booking = self.bookings.iter_mut().find(|b| b.id == id)?;
        booking.status = status;
        Some(booking)
    }

    /// Finds the newest booking whose simple id contains the fragment,
    /// case-insensitive. Empty fragments match nothing.
    #[must_use]
    pub fn find_by_fragment(&self, fragment: &str) -> Option<&Booking> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.bookings
            .iter()
            .find(|b| b.id.simple().to_string().contains(&needle))
    }
}
