//! Shared setup for tenancy coordinator integration tests.
//!
//! Every test gets its own in-memory SurrealDB with migrations applied.
//! The coordinator is built over [`FaultyApartments`] and
//! [`FaultyUsers`], which pass through to the real repositories until a
//! test arms them.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use leasehold_core::error::{LeaseholdError, LeaseholdResult};
use leasehold_core::models::apartment::{Apartment, CreateApartment, UpdateApartment};
use leasehold_core::models::user::{CreateUser, UpdateUser, User};
use leasehold_core::repository::{
    ApartmentRepository, PaginatedResult, Pagination, UserRepository,
};
use leasehold_db::repository::{
    SurrealApartmentRepository, SurrealTenancyRepository, SurrealUserRepository,
};
use leasehold_tenancy::{TenancyConfig, TenancyCoordinator};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tokio::sync::Barrier;
use uuid::Uuid;

pub type Coordinator = TenancyCoordinator<
    FaultyApartments<SurrealApartmentRepository<Db>>,
    SurrealTenancyRepository<Db>,
    FaultyUsers<SurrealUserRepository<Db>>,
>;

/// Direct repository handles on the same database, bypassing the fault
/// injection, for arranging and inspecting state.
pub struct Store {
    pub apartments: SurrealApartmentRepository<Db>,
    pub tenancies: SurrealTenancyRepository<Db>,
    pub users: SurrealUserRepository<Db>,
}

/// Switches that make the coordinator's writes fail.
#[derive(Clone, Default)]
pub struct Faults {
    pub apartment_updates: FailSwitch,
    pub user_updates: FailSwitch,
}

#[derive(Clone, Default)]
pub struct FailSwitch(Arc<AtomicBool>);

impl FailSwitch {
    pub fn arm(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    fn check(&self, what: &str) -> LeaseholdResult<()> {
        if self.0.load(Ordering::SeqCst) {
            return Err(LeaseholdError::Database(format!(
                "injected failure: {what}"
            )));
        }
        Ok(())
    }
}

pub struct TestContext {
    pub coordinator: Coordinator,
    pub store: Store,
    pub faults: Faults,
    db: Surreal<Db>,
}

pub async fn setup() -> TestContext {
    setup_with(TenancyConfig::default(), None).await
}

/// Build a context. With `gate`, every apartment lookup made by the
/// coordinator waits on the barrier first.
pub async fn setup_with(config: TenancyConfig, gate: Option<Arc<Barrier>>) -> TestContext {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leasehold_db::run_migrations(&db).await.unwrap();

    let faults = Faults::default();
    let coordinator = TenancyCoordinator::new(
        FaultyApartments {
            inner: SurrealApartmentRepository::new(db.clone()),
            fail_updates: faults.apartment_updates.clone(),
            gate,
        },
        SurrealTenancyRepository::new(db.clone()),
        FaultyUsers {
            inner: SurrealUserRepository::new(db.clone()),
            fail_updates: faults.user_updates.clone(),
        },
        config,
    );
    let store = Store {
        apartments: SurrealApartmentRepository::new(db.clone()),
        tenancies: SurrealTenancyRepository::new(db.clone()),
        users: SurrealUserRepository::new(db.clone()),
    };

    TestContext {
        coordinator,
        store,
        faults,
        db,
    }
}

// -----------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn new_apartment(unit_number: &str, max_occupants: Option<u32>) -> CreateApartment {
    CreateApartment {
        building_name: "Maple Court".into(),
        unit_number: unit_number.into(),
        floor: 2,
        rooms: 3,
        monthly_rent: Decimal::new(125000, 2),
        amenities: BTreeSet::from(["balcony".to_string()]),
        max_occupants,
    }
}

impl TestContext {
    pub async fn apartment(&self, unit_number: &str, max_occupants: u32) -> Apartment {
        self.store
            .apartments
            .create(new_apartment(unit_number, Some(max_occupants)))
            .await
            .unwrap()
    }

    pub async fn user(&self, name: &str) -> User {
        self.store
            .users
            .create(CreateUser {
                email: format!("{name}@example.com"),
                display_name: name.into(),
            })
            .await
            .unwrap()
    }

    /// Overwrite the stored occupant count without touching tenancies.
    pub async fn force_occupants(&self, apartment_id: Uuid, occupants: u32) {
        self.store
            .apartments
            .update(
                apartment_id,
                UpdateApartment {
                    current_occupants: Some(occupants),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    /// Remove a user record outright; the user repository has no delete.
    pub async fn delete_user(&self, id: Uuid) {
        self.db
            .query("DELETE type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .unwrap()
            .check()
            .unwrap();
    }

    pub async fn reload_apartment(&self, id: Uuid) -> Apartment {
        self.store.apartments.get_by_id(id).await.unwrap()
    }

    pub async fn reload_user(&self, id: Uuid) -> User {
        self.store.users.get_by_id(id).await.unwrap()
    }
}

// -----------------------------------------------------------------------
// Repository wrappers
// -----------------------------------------------------------------------

pub struct FaultyApartments<R> {
    inner: R,
    fail_updates: FailSwitch,
    gate: Option<Arc<Barrier>>,
}

impl<R: ApartmentRepository> ApartmentRepository for FaultyApartments<R> {
    async fn create(&self, input: CreateApartment) -> LeaseholdResult<Apartment> {
        self.inner.create(input).await
    }

    async fn get_by_id(&self, id: Uuid) -> LeaseholdResult<Apartment> {
        let apartment = self.inner.get_by_id(id).await?;
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        Ok(apartment)
    }

    async fn get_by_unit_number(&self, unit_number: &str) -> LeaseholdResult<Apartment> {
        self.inner.get_by_unit_number(unit_number).await
    }

    async fn update(&self, id: Uuid, input: UpdateApartment) -> LeaseholdResult<Apartment> {
        self.fail_updates.check("apartment update")?;
        self.inner.update(id, input).await
    }

    async fn adjust_occupancy(&self, id: Uuid, delta: i32) -> LeaseholdResult<Apartment> {
        self.fail_updates.check("apartment occupancy")?;
        self.inner.adjust_occupancy(id, delta).await
    }

    async fn delete(&self, id: Uuid) -> LeaseholdResult<()> {
        self.inner.delete(id).await
    }

    async fn list(&self, pagination: Pagination) -> LeaseholdResult<PaginatedResult<Apartment>> {
        self.inner.list(pagination).await
    }

    async fn list_with_vacancy(&self) -> LeaseholdResult<Vec<Apartment>> {
        self.inner.list_with_vacancy().await
    }
}

pub struct FaultyUsers<R> {
    inner: R,
    fail_updates: FailSwitch,
}

impl<R: UserRepository> UserRepository for FaultyUsers<R> {
    async fn create(&self, input: CreateUser) -> LeaseholdResult<User> {
        self.inner.create(input).await
    }

    async fn get_by_id(&self, id: Uuid) -> LeaseholdResult<User> {
        self.inner.get_by_id(id).await
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> LeaseholdResult<User> {
        self.fail_updates.check("user update")?;
        self.inner.update(id, input).await
    }
}
