//! Lease lifecycle on top of tenancy records.
//!
//! A lease is the term part of a tenancy: dates and rent. Signing a
//! lease ahead of moving in creates a `Pending` tenancy, which does not
//! hold a place in the apartment until it is activated.
//!
//! ```text
//! Pending --activate--> Active --end--> Inactive
//!    \___________________end__________/
//! ```

use chrono::NaiveDate;
use leasehold_core::error::{LeaseholdError, LeaseholdResult};
use leasehold_core::models::apartment::Apartment;
use leasehold_core::models::tenancy::{
    CreateTenancy, Tenancy, TenancyStatus, TenantRole, UpdateTenancy,
};
use leasehold_core::models::user::UpdateUser;
use leasehold_core::repository::{ApartmentRepository, TenancyRepository, UserRepository};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::compensation::Compensation;
use crate::service::{TenancyCoordinator, ensure_vacancy};
use crate::validation::{validate_lease_range, validate_rent};

/// Input for [`TenancyCoordinator::create_lease`].
#[derive(Debug, Clone)]
pub struct CreateLease {
    pub user_id: Uuid,
    pub apartment_id: Uuid,
    pub lease_start: NaiveDate,
    pub lease_end: NaiveDate,
    pub role: TenantRole,
}

/// Changes to the terms of a pending or active lease.
#[derive(Debug, Clone, Default)]
pub struct UpdateLease {
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub monthly_rent: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct LeaseDetails {
    pub tenancy: Tenancy,
    /// `None` if the apartment has since been deleted.
    pub apartment: Option<Apartment>,
    /// Length of the lease in days, both ends inclusive.
    pub term_days: i64,
    /// Days left from the reference date, both ends inclusive. Zero once
    /// the lease is over or the tenancy is inactive.
    pub days_remaining: i64,
}

/// Inclusive length of a lease.
pub fn lease_term_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Inclusive number of lease days on or after `today`.
pub fn lease_days_remaining(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> i64 {
    let from = today.max(start);
    if from > end {
        0
    } else {
        lease_term_days(from, end)
    }
}

fn ensure_transition(tenancy: &Tenancy, next: TenancyStatus) -> LeaseholdResult<()> {
    if !tenancy.status.can_transition_to(next) {
        return Err(LeaseholdError::InvalidTransition {
            tenancy_id: tenancy.id,
            from: tenancy.status.to_string(),
            to: next.to_string(),
        });
    }
    Ok(())
}

impl<A, T, U> TenancyCoordinator<A, T, U>
where
    A: ApartmentRepository,
    T: TenancyRepository,
    U: UserRepository,
{
    /// Record a signed lease as a pending tenancy.
    ///
    /// Occupancy is untouched. A user may hold a pending lease while
    /// living elsewhere, but only one pending lease per apartment.
    pub async fn create_lease(&self, input: CreateLease) -> LeaseholdResult<Tenancy> {
        let apartment = self.apartments.get_by_id(input.apartment_id).await?;
        self.users.get_by_id(input.user_id).await?;
        validate_lease_range(input.lease_start, input.lease_end)?;

        let already_pending = self
            .tenancies
            .list_by_user(input.user_id, Some(TenancyStatus::Pending))
            .await?
            .into_iter()
            .any(|t| t.apartment_id == input.apartment_id);
        if already_pending {
            return Err(LeaseholdError::AlreadyExists {
                entity: "pending tenancy".into(),
            });
        }

        let tenancy = self
            .tenancies
            .create(CreateTenancy {
                user_id: input.user_id,
                apartment_id: input.apartment_id,
                status: TenancyStatus::Pending,
                role: input.role,
                lease_start_date: input.lease_start,
                lease_end_date: input.lease_end,
                monthly_rent: apartment.monthly_rent,
            })
            .await?;

        info!(
            user_id = %input.user_id,
            apartment_id = %input.apartment_id,
            tenancy_id = %tenancy.id,
            "Lease created"
        );

        Ok(tenancy)
    }

    /// Move a pending tenancy in.
    ///
    /// Runs the same capacity and single-active checks as
    /// [`assign_tenant`](Self::assign_tenant) before any write.
    pub async fn activate_lease(&self, tenancy_id: Uuid) -> LeaseholdResult<Tenancy> {
        let pending = self.tenancies.get_by_id(tenancy_id).await?;
        ensure_transition(&pending, TenancyStatus::Active)?;

        let apartment = self.apartments.get_by_id(pending.apartment_id).await?;
        ensure_vacancy(&apartment)?;
        self.users.get_by_id(pending.user_id).await?;
        self.ensure_no_active_tenancy(pending.user_id).await?;

        let active = self
            .tenancies
            .update(
                tenancy_id,
                UpdateTenancy {
                    status: Some(TenancyStatus::Active),
                    ..Default::default()
                },
            )
            .await?;
        let undo = Compensation::SetTenancyStatus {
            tenancy_id,
            status: TenancyStatus::Pending,
        };
        let active = self
            .move_in("activate_lease", active, &apartment, undo)
            .await?;

        info!(
            user_id = %active.user_id,
            apartment_id = %active.apartment_id,
            %tenancy_id,
            "Lease activated"
        );

        Ok(active)
    }

    /// Change the dates or rent of a pending or active lease.
    ///
    /// For an active tenancy the new dates are mirrored onto the user
    /// while the user still points at the tenancy's apartment.
    pub async fn update_lease(
        &self,
        tenancy_id: Uuid,
        input: UpdateLease,
    ) -> LeaseholdResult<Tenancy> {
        let current = self.tenancies.get_by_id(tenancy_id).await?;
        if current.status == TenancyStatus::Inactive {
            return Err(LeaseholdError::validation(format!(
                "lease of inactive tenancy {tenancy_id} can no longer change"
            )));
        }

        let start = input.lease_start.unwrap_or(current.lease_start_date);
        let end = input.lease_end.unwrap_or(current.lease_end_date);
        validate_lease_range(start, end)?;
        if let Some(rent) = input.monthly_rent {
            validate_rent(rent)?;
        }

        let updated = self
            .tenancies
            .update(
                tenancy_id,
                UpdateTenancy {
                    lease_start_date: input.lease_start,
                    lease_end_date: input.lease_end,
                    monthly_rent: input.monthly_rent,
                    ..Default::default()
                },
            )
            .await?;

        if updated.status == TenancyStatus::Active {
            let committed = vec![Compensation::SetLeaseTerms {
                tenancy_id,
                start: current.lease_start_date,
                end: current.lease_end_date,
                monthly_rent: current.monthly_rent,
            }];

            let user = match self.users.get_by_id(updated.user_id).await {
                Ok(user) => user,
                Err(e) => return Err(self.unwind("update_lease", "load_user", e, committed).await),
            };
            if user.apartment_id == Some(updated.apartment_id) {
                let mirror = UpdateUser {
                    lease_start_date: Some(Some(start)),
                    lease_end_date: Some(Some(end)),
                    ..Default::default()
                };
                if let Err(e) = self.users.update(user.id, mirror).await {
                    return Err(self
                        .unwind("update_lease", "mirror_user_dates", e, committed)
                        .await);
                }
            }
        }

        info!(%tenancy_id, %start, %end, "Lease updated");

        Ok(updated)
    }

    /// End a pending or active lease.
    ///
    /// Ending an active lease releases the place exactly like
    /// [`remove_tenant`](Self::remove_tenant).
    pub async fn end_lease(&self, tenancy_id: Uuid) -> LeaseholdResult<Tenancy> {
        let tenancy = self.tenancies.get_by_id(tenancy_id).await?;
        ensure_transition(&tenancy, TenancyStatus::Inactive)?;

        let ended = match tenancy.status {
            TenancyStatus::Active => self.move_out("end_lease", tenancy).await?,
            _ => {
                self.tenancies
                    .update(
                        tenancy_id,
                        UpdateTenancy {
                            status: Some(TenancyStatus::Inactive),
                            ..Default::default()
                        },
                    )
                    .await?
            }
        };

        info!(%tenancy_id, "Lease ended");

        Ok(ended)
    }

    /// Lease terms of a tenancy joined with its apartment, with day
    /// counts relative to `today`.
    pub async fn get_lease_details(
        &self,
        tenancy_id: Uuid,
        today: NaiveDate,
    ) -> LeaseholdResult<LeaseDetails> {
        let tenancy = self.tenancies.get_by_id(tenancy_id).await?;

        let apartment = match self.apartments.get_by_id(tenancy.apartment_id).await {
            Ok(apartment) => Some(apartment),
            Err(LeaseholdError::NotFound { .. }) => {
                warn!(
                    %tenancy_id,
                    apartment_id = %tenancy.apartment_id,
                    "Tenancy references a deleted apartment"
                );
                None
            }
            Err(e) => return Err(e),
        };

        let term_days = lease_term_days(tenancy.lease_start_date, tenancy.lease_end_date);
        let days_remaining = match tenancy.status {
            TenancyStatus::Inactive => 0,
            _ => lease_days_remaining(tenancy.lease_start_date, tenancy.lease_end_date, today),
        };

        Ok(LeaseDetails {
            tenancy,
            apartment,
            term_days,
            days_remaining,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn term_is_inclusive() {
        assert_eq!(lease_term_days(date(2024, 1, 1), date(2024, 1, 1)), 1);
        // 2024 is a leap year.
        assert_eq!(lease_term_days(date(2024, 1, 1), date(2024, 12, 31)), 366);
    }

    #[test]
    fn remaining_days_before_during_and_after() {
        let (start, end) = (date(2024, 1, 1), date(2024, 1, 10));
        assert_eq!(lease_days_remaining(start, end, date(2023, 12, 1)), 10);
        assert_eq!(lease_days_remaining(start, end, date(2024, 1, 8)), 3);
        assert_eq!(lease_days_remaining(start, end, date(2024, 1, 10)), 1);
        assert_eq!(lease_days_remaining(start, end, date(2024, 1, 11)), 0);
    }
}
