//! Repository trait definitions for data access abstraction.
//!
//! Each trait is the client view of one document collection. All
//! operations are async and independently committed: the store offers
//! no transaction spanning more than one call. Timestamps
//! (`created_at`, `updated_at`) are assigned by the store at write time.

use uuid::Uuid;

use crate::error::LeaseholdResult;
use crate::models::{
    apartment::{Apartment, CreateApartment, UpdateApartment},
    tenancy::{CreateTenancy, Tenancy, TenancyStatus, UpdateTenancy},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait ApartmentRepository: Send + Sync {
    /// Create an apartment. `input.max_occupants` must already be
    /// resolved; the record starts with zero occupants.
    fn create(
        &self,
        input: CreateApartment,
    ) -> impl Future<Output = LeaseholdResult<Apartment>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<Apartment>> + Send;
    fn get_by_unit_number(
        &self,
        unit_number: &str,
    ) -> impl Future<Output = LeaseholdResult<Apartment>> + Send;
    /// Partial update: only `Some` fields are written.
    fn update(
        &self,
        id: Uuid,
        input: UpdateApartment,
    ) -> impl Future<Output = LeaseholdResult<Apartment>> + Send;
    /// Add `delta` to `current_occupants` on the stored value, floored at
    /// zero, and rederive `status` from the result.
    fn adjust_occupancy(
        &self,
        id: Uuid,
        delta: i32,
    ) -> impl Future<Output = LeaseholdResult<Apartment>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = LeaseholdResult<PaginatedResult<Apartment>>> + Send;

    /// Apartments whose `current_occupants` is below their own
    /// `max_occupants`.
    fn list_with_vacancy(&self) -> impl Future<Output = LeaseholdResult<Vec<Apartment>>> + Send;
}

/// Tenancy records have no delete: history is kept by marking them
/// inactive.
pub trait TenancyRepository: Send + Sync {
    fn create(
        &self,
        input: CreateTenancy,
    ) -> impl Future<Output = LeaseholdResult<Tenancy>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<Tenancy>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenancy,
    ) -> impl Future<Output = LeaseholdResult<Tenancy>> + Send;

    /// Tenancies of a user, optionally filtered by status, in insertion
    /// order.
    fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<TenancyStatus>,
    ) -> impl Future<Output = LeaseholdResult<Vec<Tenancy>>> + Send;

    /// Tenancies of an apartment, optionally filtered by status, in
    /// insertion order.
    fn list_by_apartment(
        &self,
        apartment_id: Uuid,
        status: Option<TenancyStatus>,
    ) -> impl Future<Output = LeaseholdResult<Vec<Tenancy>>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = LeaseholdResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = LeaseholdResult<User>> + Send;
}
