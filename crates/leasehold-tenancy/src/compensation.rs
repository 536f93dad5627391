//! Compensating actions for multi-step writes.
//!
//! Every step of a coordinator operation is committed on its own. When a
//! later step fails, the steps already committed are undone in reverse
//! order. Compensations are themselves plain writes and can fail too;
//! such failures are logged and leave the records for
//! `reconcile_occupancy` to repair.

use chrono::NaiveDate;
use leasehold_core::error::{LeaseholdError, LeaseholdResult};
use leasehold_core::models::tenancy::{TenancyStatus, UpdateTenancy};
use leasehold_core::repository::{ApartmentRepository, TenancyRepository, UserRepository};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::service::TenancyCoordinator;

/// Undo record for one committed step.
#[derive(Debug, Clone)]
pub(crate) enum Compensation {
    /// Put a tenancy back into `status`.
    SetTenancyStatus {
        tenancy_id: Uuid,
        status: TenancyStatus,
    },
    /// Reverse an occupancy adjustment on the stored count.
    AdjustOccupancy { apartment_id: Uuid, delta: i32 },
    /// Restore lease terms overwritten by an update.
    SetLeaseTerms {
        tenancy_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        monthly_rent: Decimal,
    },
}

impl<A, T, U> TenancyCoordinator<A, T, U>
where
    A: ApartmentRepository,
    T: TenancyRepository,
    U: UserRepository,
{
    /// Handle a failed write at `step` of `operation`.
    ///
    /// Returns the original error; compensation outcomes only show up in
    /// the logs.
    pub(crate) async fn unwind(
        &self,
        operation: &'static str,
        step: &'static str,
        err: LeaseholdError,
        committed: Vec<Compensation>,
    ) -> LeaseholdError {
        error!(
            operation,
            step,
            error = %err,
            committed_steps = committed.len(),
            "Write failed after earlier steps were committed"
        );

        if !self.config.compensate_failed_writes {
            warn!(
                operation,
                ?committed,
                "Compensation disabled; partial writes left in place"
            );
            return err;
        }

        for compensation in committed.iter().rev() {
            match self.compensate(compensation).await {
                Ok(()) => debug!(operation, ?compensation, "Compensated"),
                Err(e) => error!(
                    operation,
                    ?compensation,
                    error = %e,
                    "Compensation failed; records need reconciliation"
                ),
            }
        }

        err
    }

    async fn compensate(&self, compensation: &Compensation) -> LeaseholdResult<()> {
        match *compensation {
            Compensation::SetTenancyStatus { tenancy_id, status } => {
                self.tenancies
                    .update(
                        tenancy_id,
                        UpdateTenancy {
                            status: Some(status),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            Compensation::AdjustOccupancy {
                apartment_id,
                delta,
            } => {
                self.apartments.adjust_occupancy(apartment_id, delta).await?;
            }
            Compensation::SetLeaseTerms {
                tenancy_id,
                start,
                end,
                monthly_rent,
            } => {
                self.tenancies
                    .update(
                        tenancy_id,
                        UpdateTenancy {
                            lease_start_date: Some(start),
                            lease_end_date: Some(end),
                            monthly_rent: Some(monthly_rent),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
        }
        Ok(())
    }
}
