//! Apartment domain model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Occupancy status of an apartment.
///
/// Always derived from `current_occupants` and `max_occupants`; it is
/// stored alongside them for query convenience but is never the source
/// of truth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApartmentStatus {
    Available,
    Occupied,
}

impl ApartmentStatus {
    /// `Occupied` once the apartment is at (or beyond) capacity.
    pub fn for_occupancy(current_occupants: u32, max_occupants: u32) -> Self {
        if current_occupants >= max_occupants {
            Self::Occupied
        } else {
            Self::Available
        }
    }
}

/// A rentable unit within a building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apartment {
    pub id: Uuid,
    pub building_name: String,
    /// Unique across all apartments.
    pub unit_number: String,
    pub floor: i32,
    pub rooms: u32,
    pub status: ApartmentStatus,
    pub monthly_rent: Decimal,
    pub amenities: BTreeSet<String>,
    /// Per-apartment occupancy cap.
    pub max_occupants: u32,
    /// Number of active tenancies, maintained by the tenancy coordinator.
    pub current_occupants: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Apartment {
    pub fn has_vacancy(&self) -> bool {
        self.current_occupants < self.max_occupants
    }
}

/// Fields required to create a new apartment.
///
/// New apartments always start empty; `max_occupants` falls back to the
/// coordinator's configured default when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApartment {
    pub building_name: String,
    pub unit_number: String,
    pub floor: i32,
    pub rooms: u32,
    pub monthly_rent: Decimal,
    pub amenities: BTreeSet<String>,
    pub max_occupants: Option<u32>,
}

/// Fields that can be updated on an existing apartment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateApartment {
    pub building_name: Option<String>,
    pub floor: Option<i32>,
    pub rooms: Option<u32>,
    pub monthly_rent: Option<Decimal>,
    pub amenities: Option<BTreeSet<String>>,
    pub max_occupants: Option<u32>,
    pub current_occupants: Option<u32>,
    pub status: Option<ApartmentStatus>,
}
