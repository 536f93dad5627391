//! Conversions between stored string representations and domain types.

use std::str::FromStr;

use chrono::NaiveDate;
use leasehold_core::models::apartment::ApartmentStatus;
use leasehold_core::models::tenancy::{TenancyStatus, TenantRole};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::DbError;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn parse_uuid(field: &str, s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::InvalidRecord(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_optional_uuid(field: &str, s: Option<String>) -> Result<Option<Uuid>, DbError> {
    s.map(|s| parse_uuid(field, &s)).transpose()
}

pub(crate) fn parse_decimal(field: &str, s: &str) -> Result<Decimal, DbError> {
    Decimal::from_str(s).map_err(|e| DbError::InvalidRecord(format!("invalid {field}: {e}")))
}

pub(crate) fn parse_date(field: &str, s: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DbError::InvalidRecord(format!("invalid {field}: {e}")))
}

pub(crate) fn parse_optional_date(
    field: &str,
    s: Option<String>,
) -> Result<Option<NaiveDate>, DbError> {
    s.map(|s| parse_date(field, &s)).transpose()
}

pub(crate) fn date_to_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_apartment_status(s: &str) -> Result<ApartmentStatus, DbError> {
    match s {
        "Available" => Ok(ApartmentStatus::Available),
        "Occupied" => Ok(ApartmentStatus::Occupied),
        other => Err(DbError::InvalidRecord(format!(
            "unknown apartment status: {other}"
        ))),
    }
}

pub(crate) fn apartment_status_to_string(s: ApartmentStatus) -> &'static str {
    match s {
        ApartmentStatus::Available => "Available",
        ApartmentStatus::Occupied => "Occupied",
    }
}

pub(crate) fn parse_tenancy_status(s: &str) -> Result<TenancyStatus, DbError> {
    match s {
        "Pending" => Ok(TenancyStatus::Pending),
        "Active" => Ok(TenancyStatus::Active),
        "Inactive" => Ok(TenancyStatus::Inactive),
        other => Err(DbError::InvalidRecord(format!(
            "unknown tenancy status: {other}"
        ))),
    }
}

pub(crate) fn tenancy_status_to_string(s: TenancyStatus) -> &'static str {
    match s {
        TenancyStatus::Pending => "Pending",
        TenancyStatus::Active => "Active",
        TenancyStatus::Inactive => "Inactive",
    }
}

pub(crate) fn parse_role(s: &str) -> Result<TenantRole, DbError> {
    match s {
        "Primary" => Ok(TenantRole::Primary),
        "Secondary" => Ok(TenantRole::Secondary),
        other => Err(DbError::InvalidRecord(format!("unknown tenant role: {other}"))),
    }
}

pub(crate) fn role_to_string(r: TenantRole) -> &'static str {
    match r {
        TenantRole::Primary => "Primary",
        TenantRole::Secondary => "Secondary",
    }
}
