//! Tenancy coordinator: tenant assignment, removal and the read-side
//! joins over apartments, tenancies and users.
//!
//! The store commits every write on its own. Each multi-step operation
//! checks its preconditions by reading, then issues its writes in a fixed
//! order; if a later write fails, the already-committed steps are undone
//! by compensating writes. Preconditions are not locked between the read
//! and the write, so concurrent assignments to the same apartment can
//! both pass the capacity check.

use chrono::NaiveDate;
use leasehold_core::error::{LeaseholdError, LeaseholdResult};
use leasehold_core::models::apartment::{Apartment, ApartmentStatus, UpdateApartment};
use leasehold_core::models::tenancy::{
    CreateTenancy, Tenancy, TenancyStatus, TenantRole, UpdateTenancy,
};
use leasehold_core::models::user::{UpdateUser, User};
use leasehold_core::repository::{ApartmentRepository, TenancyRepository, UserRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::compensation::Compensation;
use crate::config::TenancyConfig;
use crate::validation::validate_lease_range;

/// Input for [`TenancyCoordinator::assign_tenant`].
#[derive(Debug, Clone)]
pub struct AssignTenant {
    pub user_id: Uuid,
    pub apartment_id: Uuid,
    pub lease_start: NaiveDate,
    pub lease_end: NaiveDate,
}

/// An active tenancy joined with the user it belongs to.
///
/// `user` is `None` when the tenancy points at a user document that no
/// longer exists.
#[derive(Debug, Clone)]
pub struct TenantDetails {
    pub tenancy: Tenancy,
    pub user: Option<User>,
}

/// A user's active tenancy together with the apartment it is for.
#[derive(Debug, Clone)]
pub struct Residence {
    pub tenancy: Tenancy,
    pub apartment: Apartment,
}

/// Coordinates writes across the apartment, tenancy and user
/// collections.
///
/// Generic over repository implementations so that the coordinator has
/// no dependency on the database crate; store handles are passed in at
/// construction.
pub struct TenancyCoordinator<A: ApartmentRepository, T: TenancyRepository, U: UserRepository> {
    pub(crate) apartments: A,
    pub(crate) tenancies: T,
    pub(crate) users: U,
    pub(crate) config: TenancyConfig,
}

impl<A, T, U> TenancyCoordinator<A, T, U>
where
    A: ApartmentRepository,
    T: TenancyRepository,
    U: UserRepository,
{
    pub fn new(apartments: A, tenancies: T, users: U, config: TenancyConfig) -> Self {
        Self {
            apartments,
            tenancies,
            users,
            config,
        }
    }

    pub fn config(&self) -> &TenancyConfig {
        &self.config
    }

    /// Assign a user to an apartment as its primary tenant.
    ///
    /// Preconditions, in order: the apartment exists, it has a free
    /// place, the user exists, the user has no active tenancy, and the
    /// lease does not end before it starts. Nothing is written unless
    /// all of them hold.
    ///
    /// Then: create the active tenancy (with the apartment's current
    /// rent as snapshot), bump the occupant count, point the user at the
    /// apartment.
    pub async fn assign_tenant(&self, input: AssignTenant) -> LeaseholdResult<Tenancy> {
        // 1. Apartment exists.
        let apartment = self.apartments.get_by_id(input.apartment_id).await?;

        // 2. Capacity.
        ensure_vacancy(&apartment)?;

        // 3. User exists.
        self.users.get_by_id(input.user_id).await?;

        // 4. Single active tenancy per user.
        self.ensure_no_active_tenancy(input.user_id).await?;

        // 5. Date range.
        validate_lease_range(input.lease_start, input.lease_end)?;

        // a. Tenancy record.
        let tenancy = self
            .tenancies
            .create(CreateTenancy {
                user_id: input.user_id,
                apartment_id: input.apartment_id,
                status: TenancyStatus::Active,
                role: TenantRole::Primary,
                lease_start_date: input.lease_start,
                lease_end_date: input.lease_end,
                monthly_rent: apartment.monthly_rent,
            })
            .await?;

        // b + c. Tenancies are never deleted, so undoing (a) means
        // deactivating the record.
        let undo = Compensation::SetTenancyStatus {
            tenancy_id: tenancy.id,
            status: TenancyStatus::Inactive,
        };
        let tenancy = self
            .move_in("assign_tenant", tenancy, &apartment, undo)
            .await?;

        info!(
            user_id = %input.user_id,
            apartment_id = %input.apartment_id,
            tenancy_id = %tenancy.id,
            "Tenant assigned"
        );

        Ok(tenancy)
    }

    /// End the active tenancy of `user_id` in `apartment_id`.
    ///
    /// The tenancy record is kept and marked inactive; the occupant count
    /// is decremented (never below zero) and the user's back-reference is
    /// cleared if it still points at this apartment. Fails with
    /// `NotFound` and writes nothing when there is no such tenancy.
    pub async fn remove_tenant(
        &self,
        user_id: Uuid,
        apartment_id: Uuid,
    ) -> LeaseholdResult<Tenancy> {
        let tenancy = self.find_active_tenancy(user_id, apartment_id).await?;
        let tenancy = self.move_out("remove_tenant", tenancy).await?;

        info!(
            %user_id,
            %apartment_id,
            tenancy_id = %tenancy.id,
            "Tenant removed"
        );

        Ok(tenancy)
    }

    /// Active tenancies of an apartment, each joined with its user.
    ///
    /// Issues one user lookup per tenancy. Ordering follows the store's
    /// query result and is not part of the contract.
    pub async fn get_apartment_tenants(
        &self,
        apartment_id: Uuid,
    ) -> LeaseholdResult<Vec<TenantDetails>> {
        let tenancies = self
            .tenancies
            .list_by_apartment(apartment_id, Some(TenancyStatus::Active))
            .await?;

        let mut tenants = Vec::with_capacity(tenancies.len());
        for tenancy in tenancies {
            let user = match self.users.get_by_id(tenancy.user_id).await {
                Ok(user) => Some(user),
                Err(LeaseholdError::NotFound { .. }) => {
                    warn!(
                        tenancy_id = %tenancy.id,
                        user_id = %tenancy.user_id,
                        "Active tenancy references a missing user"
                    );
                    None
                }
                Err(e) => return Err(e),
            };
            tenants.push(TenantDetails { tenancy, user });
        }

        Ok(tenants)
    }

    /// Apartments with at least one free place, measured against each
    /// apartment's own `max_occupants`.
    pub async fn get_available_apartments(&self) -> LeaseholdResult<Vec<Apartment>> {
        self.apartments.list_with_vacancy().await
    }

    /// The user's active tenancy and its apartment, if any.
    pub async fn get_tenant_apartment(
        &self,
        user_id: Uuid,
    ) -> LeaseholdResult<Option<Residence>> {
        let mut active = self
            .tenancies
            .list_by_user(user_id, Some(TenancyStatus::Active))
            .await?;

        if active.len() > 1 {
            warn!(
                %user_id,
                count = active.len(),
                "User has more than one active tenancy"
            );
        }
        if active.is_empty() {
            return Ok(None);
        }

        let tenancy = active.remove(0);
        let apartment = self.apartments.get_by_id(tenancy.apartment_id).await?;

        Ok(Some(Residence { tenancy, apartment }))
    }

    /// Change the role of the user's active tenancy in an apartment.
    pub async fn update_tenant_role(
        &self,
        user_id: Uuid,
        apartment_id: Uuid,
        role: TenantRole,
    ) -> LeaseholdResult<Tenancy> {
        let tenancy = self.find_active_tenancy(user_id, apartment_id).await?;

        let updated = self
            .tenancies
            .update(
                tenancy.id,
                UpdateTenancy {
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await?;

        debug!(tenancy_id = %updated.id, ?role, "Tenant role updated");

        Ok(updated)
    }

    // -------------------------------------------------------------------
    // Shared steps
    // -------------------------------------------------------------------

    pub(crate) async fn ensure_no_active_tenancy(&self, user_id: Uuid) -> LeaseholdResult<()> {
        let active = self
            .tenancies
            .list_by_user(user_id, Some(TenancyStatus::Active))
            .await?;

        if !active.is_empty() {
            return Err(LeaseholdError::DuplicateActiveTenancy { user_id });
        }
        Ok(())
    }

    pub(crate) async fn find_active_tenancy(
        &self,
        user_id: Uuid,
        apartment_id: Uuid,
    ) -> LeaseholdResult<Tenancy> {
        self.tenancies
            .list_by_user(user_id, Some(TenancyStatus::Active))
            .await?
            .into_iter()
            .find(|t| t.apartment_id == apartment_id)
            .ok_or_else(|| {
                LeaseholdError::not_found(
                    "tenancy",
                    format!("user={user_id}, apartment={apartment_id}"),
                )
            })
    }

    /// Write the occupant count together with the status derived from
    /// it.
    pub(crate) async fn set_occupancy(
        &self,
        apartment_id: Uuid,
        occupants: u32,
        max_occupants: u32,
    ) -> LeaseholdResult<Apartment> {
        self.apartments
            .update(
                apartment_id,
                UpdateApartment {
                    current_occupants: Some(occupants),
                    status: Some(ApartmentStatus::for_occupancy(occupants, max_occupants)),
                    ..Default::default()
                },
            )
            .await
    }

    /// Occupancy and user steps shared by assignment and lease
    /// activation. `tenancy` has already been committed as active;
    /// `undo_tenancy` reverts that first step.
    ///
    /// The capacity check ran against `apartment` as read earlier; the
    /// increment itself lands on the stored count.
    pub(crate) async fn move_in(
        &self,
        operation: &'static str,
        tenancy: Tenancy,
        apartment: &Apartment,
        undo_tenancy: Compensation,
    ) -> LeaseholdResult<Tenancy> {
        let mut committed = vec![undo_tenancy];

        if let Err(e) = self.apartments.adjust_occupancy(apartment.id, 1).await {
            return Err(self
                .unwind(operation, "increment_occupancy", e, committed)
                .await);
        }
        committed.push(Compensation::AdjustOccupancy {
            apartment_id: apartment.id,
            delta: -1,
        });

        if let Err(e) = self
            .users
            .update(
                tenancy.user_id,
                UpdateUser::move_in(
                    apartment.id,
                    tenancy.lease_start_date,
                    tenancy.lease_end_date,
                ),
            )
            .await
        {
            return Err(self.unwind(operation, "link_user", e, committed).await);
        }

        Ok(tenancy)
    }

    /// Deactivate an active tenancy, release its place and unlink the
    /// user.
    pub(crate) async fn move_out(
        &self,
        operation: &'static str,
        tenancy: Tenancy,
    ) -> LeaseholdResult<Tenancy> {
        let ended = self
            .tenancies
            .update(
                tenancy.id,
                UpdateTenancy {
                    status: Some(TenancyStatus::Inactive),
                    ..Default::default()
                },
            )
            .await?;
        let mut committed = vec![Compensation::SetTenancyStatus {
            tenancy_id: tenancy.id,
            status: tenancy.status,
        }];

        let apartment = match self.apartments.get_by_id(tenancy.apartment_id).await {
            Ok(apartment) => apartment,
            Err(e) => return Err(self.unwind(operation, "load_apartment", e, committed).await),
        };
        if let Err(e) = self.apartments.adjust_occupancy(apartment.id, -1).await {
            return Err(self
                .unwind(operation, "decrement_occupancy", e, committed)
                .await);
        }
        // A decrement floored at zero released nothing.
        if apartment.current_occupants > 0 {
            committed.push(Compensation::AdjustOccupancy {
                apartment_id: apartment.id,
                delta: 1,
            });
        }

        let user = match self.users.get_by_id(tenancy.user_id).await {
            Ok(user) => user,
            Err(LeaseholdError::NotFound { .. }) => {
                warn!(
                    user_id = %tenancy.user_id,
                    tenancy_id = %tenancy.id,
                    "Tenant user no longer exists; nothing to unlink"
                );
                return Ok(ended);
            }
            Err(e) => return Err(self.unwind(operation, "load_user", e, committed).await),
        };
        if user.apartment_id == Some(tenancy.apartment_id) {
            if let Err(e) = self.users.update(user.id, UpdateUser::move_out()).await {
                return Err(self.unwind(operation, "unlink_user", e, committed).await);
            }
        } else {
            debug!(
                user_id = %user.id,
                tenancy_id = %tenancy.id,
                "User back-reference points elsewhere; left unchanged"
            );
        }

        Ok(ended)
    }
}

/// Capacity precondition, read from the apartment itself.
pub(crate) fn ensure_vacancy(apartment: &Apartment) -> LeaseholdResult<()> {
    if !apartment.has_vacancy() {
        return Err(LeaseholdError::CapacityExceeded {
            apartment_id: apartment.id,
            max_occupants: apartment.max_occupants,
        });
    }
    Ok(())
}
