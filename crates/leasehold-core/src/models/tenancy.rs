//! Tenancy domain model.
//!
//! A tenancy links a user to an apartment for a lease period. Records
//! are never physically deleted: ending a tenancy marks it inactive so
//! the history of who lived where is preserved.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TenancyStatus {
    /// Lease signed, tenant not yet moved in. Does not count towards
    /// occupancy.
    Pending,
    Active,
    /// Terminal. A later tenancy of the same user is a new record.
    Inactive,
}

impl TenancyStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: TenancyStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active)
                | (Self::Pending, Self::Inactive)
                | (Self::Active, Self::Inactive)
        )
    }
}

impl fmt::Display for TenancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Inactive => "inactive",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TenantRole {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenancy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub apartment_id: Uuid,
    pub status: TenancyStatus,
    pub role: TenantRole,
    pub lease_start_date: NaiveDate,
    pub lease_end_date: NaiveDate,
    /// Snapshot of the apartment rent when the tenancy was created.
    pub monthly_rent: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenancy {
    pub user_id: Uuid,
    pub apartment_id: Uuid,
    pub status: TenancyStatus,
    pub role: TenantRole,
    pub lease_start_date: NaiveDate,
    pub lease_end_date: NaiveDate,
    pub monthly_rent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenancy {
    pub status: Option<TenancyStatus>,
    pub role: Option<TenantRole>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
    pub monthly_rent: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_is_terminal() {
        for next in [
            TenancyStatus::Pending,
            TenancyStatus::Active,
            TenancyStatus::Inactive,
        ] {
            assert!(!TenancyStatus::Inactive.can_transition_to(next));
        }
    }

    #[test]
    fn active_cannot_return_to_pending() {
        assert!(!TenancyStatus::Active.can_transition_to(TenancyStatus::Pending));
        assert!(TenancyStatus::Pending.can_transition_to(TenancyStatus::Active));
        assert!(TenancyStatus::Active.can_transition_to(TenancyStatus::Inactive));
    }
}
