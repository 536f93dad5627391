//! Failure of a later write in a multi-step operation, with and without
//! compensation of the steps already committed.

mod common;

use common::{TestContext, date, setup, setup_with};
use leasehold_core::error::LeaseholdError;
use leasehold_core::models::apartment::ApartmentStatus;
use leasehold_core::models::tenancy::{Tenancy, TenancyStatus, TenantRole};
use leasehold_core::repository::TenancyRepository;
use leasehold_tenancy::{AssignTenant, CreateLease, TenancyConfig, UpdateLease};
use rust_decimal::Decimal;
use uuid::Uuid;

fn assign(user_id: Uuid, apartment_id: Uuid) -> AssignTenant {
    AssignTenant {
        user_id,
        apartment_id,
        lease_start: date(2024, 1, 1),
        lease_end: date(2024, 12, 31),
    }
}

fn without_compensation() -> TenancyConfig {
    TenancyConfig {
        compensate_failed_writes: false,
        ..Default::default()
    }
}

async fn only_tenancy(ctx: &TestContext, user_id: Uuid) -> Tenancy {
    let mut all = ctx.store.tenancies.list_by_user(user_id, None).await.unwrap();
    assert_eq!(all.len(), 1);
    all.remove(0)
}

// -----------------------------------------------------------------------
// assign_tenant
// -----------------------------------------------------------------------

#[tokio::test]
async fn failed_user_link_undoes_assignment() {
    let ctx = setup().await;
    let apartment = ctx.apartment("1A", 1).await;
    let user = ctx.user("alice").await;
    ctx.faults.user_updates.arm();

    let err = ctx
        .coordinator
        .assign_tenant(assign(user.id, apartment.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LeaseholdError::Database(_)));

    let tenancy = only_tenancy(&ctx, user.id).await;
    assert_eq!(tenancy.status, TenancyStatus::Inactive);

    let apartment = ctx.reload_apartment(apartment.id).await;
    assert_eq!(apartment.current_occupants, 0);
    assert_eq!(apartment.status, ApartmentStatus::Available);
    assert_eq!(ctx.reload_user(user.id).await.apartment_id, None);

    // The user is free to be assigned again once the store recovers.
    ctx.faults.user_updates.disarm();
    ctx.coordinator
        .assign_tenant(assign(user.id, apartment.id))
        .await
        .unwrap();
}

#[tokio::test]
async fn failed_occupancy_write_deactivates_new_tenancy() {
    let ctx = setup().await;
    let apartment = ctx.apartment("1A", 2).await;
    let user = ctx.user("alice").await;
    ctx.faults.apartment_updates.arm();

    ctx.coordinator
        .assign_tenant(assign(user.id, apartment.id))
        .await
        .unwrap_err();

    assert_eq!(only_tenancy(&ctx, user.id).await.status, TenancyStatus::Inactive);
    assert_eq!(ctx.reload_apartment(apartment.id).await.current_occupants, 0);
    assert_eq!(ctx.reload_user(user.id).await.apartment_id, None);
}

#[tokio::test]
async fn without_compensation_partial_assignment_remains() {
    let ctx = setup_with(without_compensation(), None).await;
    let apartment = ctx.apartment("1A", 1).await;
    let user = ctx.user("alice").await;
    ctx.faults.user_updates.arm();

    let err = ctx
        .coordinator
        .assign_tenant(assign(user.id, apartment.id))
        .await
        .unwrap_err();
    assert!(matches!(err, LeaseholdError::Database(_)));

    assert_eq!(only_tenancy(&ctx, user.id).await.status, TenancyStatus::Active);
    let apartment = ctx.reload_apartment(apartment.id).await;
    assert_eq!(apartment.current_occupants, 1);
    assert_eq!(apartment.status, ApartmentStatus::Occupied);
    assert_eq!(ctx.reload_user(user.id).await.apartment_id, None);
}

// -----------------------------------------------------------------------
// remove_tenant
// -----------------------------------------------------------------------

#[tokio::test]
async fn failed_occupancy_release_reactivates_tenancy() {
    let ctx = setup().await;
    let apartment = ctx.apartment("1A", 2).await;
    let user = ctx.user("alice").await;
    ctx.coordinator
        .assign_tenant(assign(user.id, apartment.id))
        .await
        .unwrap();
    ctx.faults.apartment_updates.arm();

    ctx.coordinator
        .remove_tenant(user.id, apartment.id)
        .await
        .unwrap_err();

    assert_eq!(only_tenancy(&ctx, user.id).await.status, TenancyStatus::Active);
    assert_eq!(ctx.reload_apartment(apartment.id).await.current_occupants, 1);
    assert_eq!(ctx.reload_user(user.id).await.apartment_id, Some(apartment.id));
}

#[tokio::test]
async fn failed_user_unlink_restores_occupancy_and_tenancy() {
    let ctx = setup().await;
    let apartment = ctx.apartment("1A", 1).await;
    let user = ctx.user("alice").await;
    ctx.coordinator
        .assign_tenant(assign(user.id, apartment.id))
        .await
        .unwrap();
    ctx.faults.user_updates.arm();

    ctx.coordinator
        .remove_tenant(user.id, apartment.id)
        .await
        .unwrap_err();

    assert_eq!(only_tenancy(&ctx, user.id).await.status, TenancyStatus::Active);
    let apartment = ctx.reload_apartment(apartment.id).await;
    assert_eq!(apartment.current_occupants, 1);
    assert_eq!(apartment.status, ApartmentStatus::Occupied);
}

#[tokio::test]
async fn without_compensation_partial_removal_remains() {
    let ctx = setup_with(without_compensation(), None).await;
    let apartment = ctx.apartment("1A", 2).await;
    let user = ctx.user("alice").await;
    ctx.coordinator
        .assign_tenant(assign(user.id, apartment.id))
        .await
        .unwrap();
    ctx.faults.apartment_updates.arm();

    ctx.coordinator
        .remove_tenant(user.id, apartment.id)
        .await
        .unwrap_err();

    assert_eq!(only_tenancy(&ctx, user.id).await.status, TenancyStatus::Inactive);
    assert_eq!(ctx.reload_apartment(apartment.id).await.current_occupants, 1);

    // Drift left behind is what reconciliation repairs.
    ctx.faults.apartment_updates.disarm();
    let report = ctx
        .coordinator
        .reconcile_occupancy(apartment.id)
        .await
        .unwrap();
    assert!(report.repaired);
    assert_eq!(ctx.reload_apartment(apartment.id).await.current_occupants, 0);
}

// -----------------------------------------------------------------------
// Lease operations
// -----------------------------------------------------------------------

#[tokio::test]
async fn failed_activation_returns_lease_to_pending() {
    let ctx = setup().await;
    let apartment = ctx.apartment("1A", 2).await;
    let user = ctx.user("alice").await;
    let lease = ctx
        .coordinator
        .create_lease(CreateLease {
            user_id: user.id,
            apartment_id: apartment.id,
            lease_start: date(2024, 1, 1),
            lease_end: date(2024, 12, 31),
            role: TenantRole::Primary,
        })
        .await
        .unwrap();
    ctx.faults.user_updates.arm();

    ctx.coordinator.activate_lease(lease.id).await.unwrap_err();

    let stored = ctx.store.tenancies.get_by_id(lease.id).await.unwrap();
    assert_eq!(stored.status, TenancyStatus::Pending);
    assert_eq!(ctx.reload_apartment(apartment.id).await.current_occupants, 0);

    ctx.faults.user_updates.disarm();
    let active = ctx.coordinator.activate_lease(lease.id).await.unwrap();
    assert_eq!(active.status, TenancyStatus::Active);
}

#[tokio::test]
async fn failed_date_mirror_restores_lease_terms() {
    let ctx = setup().await;
    let apartment = ctx.apartment("1A", 2).await;
    let user = ctx.user("alice").await;
    let tenancy = ctx
        .coordinator
        .assign_tenant(assign(user.id, apartment.id))
        .await
        .unwrap();
    ctx.faults.user_updates.arm();

    ctx.coordinator
        .update_lease(
            tenancy.id,
            UpdateLease {
                lease_end: Some(date(2025, 6, 30)),
                monthly_rent: Some(Decimal::new(99000, 2)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    let stored = ctx.store.tenancies.get_by_id(tenancy.id).await.unwrap();
    assert_eq!(stored.lease_end_date, date(2024, 12, 31));
    assert_eq!(stored.monthly_rent, tenancy.monthly_rent);
    assert_eq!(
        ctx.reload_user(user.id).await.lease_end_date,
        Some(date(2024, 12, 31))
    );
}
