//! User domain model.
//!
//! Users are provisioned by the identity flow. Leasehold only maintains
//! the apartment back-reference and the lease dates mirrored from the
//! user's active tenancy.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    /// Weak pointer to the apartment of the active tenancy.
    pub apartment_id: Option<Uuid>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub display_name: Option<String>,
    /// `Some(Some(id))` = set, `Some(None)` = clear, `None` = no change.
    pub apartment_id: Option<Option<Uuid>>,
    pub lease_start_date: Option<Option<NaiveDate>>,
    pub lease_end_date: Option<Option<NaiveDate>>,
}

impl UpdateUser {
    /// Point the user at an apartment and mirror the lease dates.
    pub fn move_in(apartment_id: Uuid, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            apartment_id: Some(Some(apartment_id)),
            lease_start_date: Some(Some(start)),
            lease_end_date: Some(Some(end)),
            ..Default::default()
        }
    }

    /// Clear the apartment back-reference and the lease mirrors.
    pub fn move_out() -> Self {
        Self {
            apartment_id: Some(None),
            lease_start_date: Some(None),
            lease_end_date: Some(None),
            ..Default::default()
        }
    }
}
