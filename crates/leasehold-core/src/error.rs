//! Error types for the Leasehold system.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LeaseholdError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Apartment {apartment_id} is at capacity ({max_occupants} occupants)")]
    CapacityExceeded {
        apartment_id: Uuid,
        max_occupants: u32,
    },

    #[error("User {user_id} already has an active tenancy")]
    DuplicateActiveTenancy { user_id: Uuid },

    #[error("Invalid lease date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Apartment {apartment_id} still has {active_tenancies} active tenancies")]
    ApartmentOccupied {
        apartment_id: Uuid,
        active_tenancies: usize,
    },

    #[error("Tenancy {tenancy_id} cannot move from {from} to {to}")]
    InvalidTransition {
        tenancy_id: Uuid,
        from: String,
        to: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LeaseholdError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type LeaseholdResult<T> = Result<T, LeaseholdError>;
