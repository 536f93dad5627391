//! Input validation shared by the coordinator operations.
//!
//! All checks here are pure and run before any store write.

use chrono::NaiveDate;
use leasehold_core::error::{LeaseholdError, LeaseholdResult};
use leasehold_core::models::apartment::CreateApartment;
use rust_decimal::Decimal;

/// A lease may start and end on the same day, but never end first.
pub fn validate_lease_range(start: NaiveDate, end: NaiveDate) -> LeaseholdResult<()> {
    if start > end {
        return Err(LeaseholdError::InvalidDateRange { start, end });
    }
    Ok(())
}

pub fn validate_rent(rent: Decimal) -> LeaseholdResult<()> {
    if rent < Decimal::ZERO {
        return Err(LeaseholdError::validation(format!(
            "monthly_rent must not be negative, got {rent}"
        )));
    }
    Ok(())
}

/// Check the required and numeric fields of a new apartment.
///
/// `max_occupants` is expected to be resolved already.
pub fn validate_new_apartment(input: &CreateApartment) -> LeaseholdResult<()> {
    if input.building_name.trim().is_empty() {
        return Err(LeaseholdError::validation("building_name is required"));
    }
    if input.unit_number.trim().is_empty() {
        return Err(LeaseholdError::validation("unit_number is required"));
    }
    if input.rooms == 0 {
        return Err(LeaseholdError::validation("rooms must be at least 1"));
    }
    match input.max_occupants {
        Some(0) => {
            return Err(LeaseholdError::validation(
                "max_occupants must be at least 1",
            ));
        }
        None => return Err(LeaseholdError::validation("max_occupants is required")),
        Some(_) => {}
    }
    validate_rent(input.monthly_rent)
}
