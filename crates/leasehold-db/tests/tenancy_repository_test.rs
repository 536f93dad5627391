//! Integration tests for the Tenancy and User repositories using
//! in-memory SurrealDB.

use chrono::NaiveDate;
use leasehold_core::error::LeaseholdError;
use leasehold_core::models::tenancy::{CreateTenancy, TenancyStatus, TenantRole, UpdateTenancy};
use leasehold_core::models::user::{CreateUser, UpdateUser};
use leasehold_core::repository::{TenancyRepository, UserRepository};
use leasehold_db::repository::{SurrealTenancyRepository, SurrealUserRepository};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> (
    SurrealTenancyRepository<surrealdb::engine::local::Db>,
    SurrealUserRepository<surrealdb::engine::local::Db>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leasehold_db::run_migrations(&db).await.unwrap();
    (
        SurrealTenancyRepository::new(db.clone()),
        SurrealUserRepository::new(db),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tenancy(user_id: Uuid, apartment_id: Uuid, status: TenancyStatus) -> CreateTenancy {
    CreateTenancy {
        user_id,
        apartment_id,
        status,
        role: TenantRole::Primary,
        lease_start_date: date(2024, 1, 1),
        lease_end_date: date(2024, 12, 31),
        monthly_rent: Decimal::new(95000, 2),
    }
}

// -----------------------------------------------------------------------
// Tenancy tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_tenancy() {
    let (repo, _) = setup().await;
    let user_id = Uuid::new_v4();
    let apartment_id = Uuid::new_v4();

    let created = repo
        .create(tenancy(user_id, apartment_id, TenancyStatus::Active))
        .await
        .unwrap();

    assert_eq!(created.user_id, user_id);
    assert_eq!(created.apartment_id, apartment_id);
    assert_eq!(created.status, TenancyStatus::Active);
    assert_eq!(created.role, TenantRole::Primary);
    assert_eq!(created.lease_start_date, date(2024, 1, 1));
    assert_eq!(created.lease_end_date, date(2024, 12, 31));
    assert_eq!(created.monthly_rent, Decimal::new(95000, 2));

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.status, TenancyStatus::Active);
}

#[tokio::test]
async fn update_tenancy_status_and_role() {
    let (repo, _) = setup().await;

    let created = repo
        .create(tenancy(Uuid::new_v4(), Uuid::new_v4(), TenancyStatus::Active))
        .await
        .unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateTenancy {
                status: Some(TenancyStatus::Inactive),
                role: Some(TenantRole::Secondary),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, TenancyStatus::Inactive);
    assert_eq!(updated.role, TenantRole::Secondary);
    assert_eq!(updated.lease_end_date, created.lease_end_date);
}

#[tokio::test]
async fn update_missing_tenancy_is_not_found() {
    let (repo, _) = setup().await;

    let err = repo
        .update(
            Uuid::new_v4(),
            UpdateTenancy {
                status: Some(TenancyStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LeaseholdError::NotFound { .. }));
}

#[tokio::test]
async fn list_by_user_filters_on_status() {
    let (repo, _) = setup().await;
    let user_id = Uuid::new_v4();

    repo.create(tenancy(user_id, Uuid::new_v4(), TenancyStatus::Inactive))
        .await
        .unwrap();
    let active = repo
        .create(tenancy(user_id, Uuid::new_v4(), TenancyStatus::Active))
        .await
        .unwrap();
    // Someone else's tenancy must not leak into the result.
    repo.create(tenancy(Uuid::new_v4(), Uuid::new_v4(), TenancyStatus::Active))
        .await
        .unwrap();

    let all = repo.list_by_user(user_id, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let only_active = repo
        .list_by_user(user_id, Some(TenancyStatus::Active))
        .await
        .unwrap();
    assert_eq!(only_active.len(), 1);
    assert_eq!(only_active[0].id, active.id);
}

#[tokio::test]
async fn list_by_apartment_filters_on_status() {
    let (repo, _) = setup().await;
    let apartment_id = Uuid::new_v4();

    for status in [
        TenancyStatus::Active,
        TenancyStatus::Active,
        TenancyStatus::Pending,
        TenancyStatus::Inactive,
    ] {
        repo.create(tenancy(Uuid::new_v4(), apartment_id, status))
            .await
            .unwrap();
    }

    let active = repo
        .list_by_apartment(apartment_id, Some(TenancyStatus::Active))
        .await
        .unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|t| t.apartment_id == apartment_id));

    let everything = repo.list_by_apartment(apartment_id, None).await.unwrap();
    assert_eq!(everything.len(), 4);
}

// -----------------------------------------------------------------------
// User tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_user() {
    let (_, users) = setup().await;

    let user = users
        .create(CreateUser {
            email: "alice@example.com".into(),
            display_name: "Alice".into(),
        })
        .await
        .unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert!(user.apartment_id.is_none());
    assert!(user.lease_start_date.is_none());

    let fetched = users.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.display_name, "Alice");
}

#[tokio::test]
async fn user_back_reference_can_be_set_and_cleared() {
    let (_, users) = setup().await;
    let apartment_id = Uuid::new_v4();

    let user = users
        .create(CreateUser {
            email: "bob@example.com".into(),
            display_name: "Bob".into(),
        })
        .await
        .unwrap();

    let moved_in = users
        .update(
            user.id,
            UpdateUser::move_in(apartment_id, date(2024, 3, 1), date(2025, 2, 28)),
        )
        .await
        .unwrap();
    assert_eq!(moved_in.apartment_id, Some(apartment_id));
    assert_eq!(moved_in.lease_start_date, Some(date(2024, 3, 1)));
    assert_eq!(moved_in.lease_end_date, Some(date(2025, 2, 28)));
    assert_eq!(moved_in.display_name, "Bob");

    let moved_out = users.update(user.id, UpdateUser::move_out()).await.unwrap();
    assert!(moved_out.apartment_id.is_none());
    assert!(moved_out.lease_start_date.is_none());
    assert!(moved_out.lease_end_date.is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (_, users) = setup().await;

    let input = CreateUser {
        email: "carol@example.com".into(),
        display_name: "Carol".into(),
    };
    users.create(input.clone()).await.unwrap();

    let err = users.create(input).await.unwrap_err();
    assert!(matches!(err, LeaseholdError::Database(_)));
}
