//! Apartment administration and occupancy reconciliation.

use leasehold_core::error::{LeaseholdError, LeaseholdResult};
use leasehold_core::models::apartment::{Apartment, ApartmentStatus, CreateApartment};
use leasehold_core::models::tenancy::TenancyStatus;
use leasehold_core::repository::{
    ApartmentRepository, Pagination, TenancyRepository, UserRepository,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::service::TenancyCoordinator;
use crate::validation::validate_new_apartment;

/// Outcome of comparing an apartment's recorded occupant count with its
/// active tenancies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyReport {
    pub apartment_id: Uuid,
    /// `current_occupants` as stored before reconciliation.
    pub recorded: u32,
    /// Number of active tenancies.
    pub actual: u32,
    pub max_occupants: u32,
    /// Whether the stored count (and status) was rewritten.
    pub repaired: bool,
}

impl OccupancyReport {
    pub fn drifted(&self) -> bool {
        self.recorded != self.actual
    }

    pub fn over_capacity(&self) -> bool {
        self.actual > self.max_occupants
    }
}

impl<A, T, U> TenancyCoordinator<A, T, U>
where
    A: ApartmentRepository,
    T: TenancyRepository,
    U: UserRepository,
{
    /// Create an apartment with zero occupants.
    ///
    /// A missing `max_occupants` falls back to the configured default.
    /// Unit numbers are unique.
    pub async fn create_apartment(
        &self,
        mut input: CreateApartment,
    ) -> LeaseholdResult<Apartment> {
        input
            .max_occupants
            .get_or_insert(self.config.default_max_occupants);
        validate_new_apartment(&input)?;

        match self.apartments.get_by_unit_number(&input.unit_number).await {
            Ok(_) => {
                return Err(LeaseholdError::AlreadyExists {
                    entity: format!("apartment {}", input.unit_number),
                });
            }
            Err(LeaseholdError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let apartment = self.apartments.create(input).await?;

        info!(
            apartment_id = %apartment.id,
            unit_number = %apartment.unit_number,
            max_occupants = apartment.max_occupants,
            "Apartment created"
        );

        Ok(apartment)
    }

    /// Delete an apartment that no active tenancy refers to.
    ///
    /// Pending and inactive tenancies keep their dangling reference.
    pub async fn delete_apartment(&self, apartment_id: Uuid) -> LeaseholdResult<()> {
        self.apartments.get_by_id(apartment_id).await?;

        let active = self
            .tenancies
            .list_by_apartment(apartment_id, Some(TenancyStatus::Active))
            .await?;
        if !active.is_empty() {
            return Err(LeaseholdError::ApartmentOccupied {
                apartment_id,
                active_tenancies: active.len(),
            });
        }

        self.apartments.delete(apartment_id).await?;
        info!(%apartment_id, "Apartment deleted");
        Ok(())
    }

    /// Recount an apartment's active tenancies and rewrite
    /// `current_occupants` and `status` when the stored values disagree.
    ///
    /// An apartment found over capacity is reported, never repaired by
    /// ending tenancies.
    pub async fn reconcile_occupancy(
        &self,
        apartment_id: Uuid,
    ) -> LeaseholdResult<OccupancyReport> {
        let apartment = self.apartments.get_by_id(apartment_id).await?;
        let active = self
            .tenancies
            .list_by_apartment(apartment_id, Some(TenancyStatus::Active))
            .await?;
        let actual = u32::try_from(active.len()).map_err(|_| {
            LeaseholdError::Internal(format!(
                "apartment {apartment_id} has more active tenancies than fit in u32"
            ))
        })?;

        let mut report = OccupancyReport {
            apartment_id,
            recorded: apartment.current_occupants,
            actual,
            max_occupants: apartment.max_occupants,
            repaired: false,
        };

        let expected_status = ApartmentStatus::for_occupancy(actual, apartment.max_occupants);
        if report.drifted() || apartment.status != expected_status {
            self.set_occupancy(apartment_id, actual, apartment.max_occupants)
                .await?;
            report.repaired = true;
            warn!(
                %apartment_id,
                recorded = report.recorded,
                actual,
                "Occupancy drift repaired"
            );
        }
        if report.over_capacity() {
            warn!(
                %apartment_id,
                actual,
                max_occupants = apartment.max_occupants,
                "Apartment is over capacity"
            );
        }

        Ok(report)
    }

    /// Reconcile every apartment, one page at a time. Returns only the
    /// reports that found drift or overcrowding.
    pub async fn audit_occupancy(&self) -> LeaseholdResult<Vec<OccupancyReport>> {
        let mut findings = Vec::new();
        let mut pagination = Pagination::default();
        let mut checked = 0u64;

        loop {
            let page = self.apartments.list(pagination.clone()).await?;
            let fetched = page.items.len() as u64;

            for apartment in page.items {
                let report = self.reconcile_occupancy(apartment.id).await?;
                if report.repaired || report.over_capacity() {
                    findings.push(report);
                }
            }
            checked += fetched;

            if fetched < pagination.limit || checked >= page.total {
                break;
            }
            pagination.offset += fetched;
        }

        info!(checked, findings = findings.len(), "Occupancy audit finished");

        Ok(findings)
    }
}
