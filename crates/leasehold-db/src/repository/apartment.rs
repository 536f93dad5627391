//! SurrealDB implementation of [`ApartmentRepository`].

use chrono::{DateTime, Utc};
use leasehold_core::error::{LeaseholdError, LeaseholdResult};
use leasehold_core::models::apartment::{
    Apartment, ApartmentStatus, CreateApartment, UpdateApartment,
};
use leasehold_core::repository::{ApartmentRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::convert::{
    apartment_status_to_string, parse_apartment_status, parse_decimal, parse_uuid,
};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ApartmentRow {
    building_name: String,
    unit_number: String,
    floor: i32,
    rooms: u32,
    status: String,
    monthly_rent: String,
    amenities: Vec<String>,
    max_occupants: u32,
    current_occupants: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ApartmentRowWithId {
    record_id: String,
    building_name: String,
    unit_number: String,
    floor: i32,
    rooms: u32,
    status: String,
    monthly_rent: String,
    amenities: Vec<String>,
    max_occupants: u32,
    current_occupants: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApartmentRow {
    fn into_apartment(self, id: Uuid) -> Result<Apartment, DbError> {
        Ok(Apartment {
            id,
            building_name: self.building_name,
            unit_number: self.unit_number,
            floor: self.floor,
            rooms: self.rooms,
            status: parse_apartment_status(&self.status)?,
            monthly_rent: parse_decimal("monthly_rent", &self.monthly_rent)?,
            amenities: self.amenities.into_iter().collect(),
            max_occupants: self.max_occupants,
            current_occupants: self.current_occupants,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ApartmentRowWithId {
    fn try_into_apartment(self) -> Result<Apartment, DbError> {
        let id = parse_uuid("apartment", &self.record_id)?;
        ApartmentRow {
            building_name: self.building_name,
            unit_number: self.unit_number,
            floor: self.floor,
            rooms: self.rooms,
            status: self.status,
            monthly_rent: self.monthly_rent,
            amenities: self.amenities,
            max_occupants: self.max_occupants,
            current_occupants: self.current_occupants,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_apartment(id)
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Apartment repository.
#[derive(Clone)]
pub struct SurrealApartmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealApartmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ApartmentRepository for SurrealApartmentRepository<C> {
    async fn create(&self, input: CreateApartment) -> LeaseholdResult<Apartment> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let max_occupants = input
            .max_occupants
            .ok_or_else(|| LeaseholdError::validation("max_occupants is required"))?;

        let result = self
            .db
            .query(
                "CREATE type::record('apartment', $id) SET \
                 building_name = $building_name, \
                 unit_number = $unit_number, \
                 floor = $floor, rooms = $rooms, \
                 status = $status, \
                 monthly_rent = $monthly_rent, \
                 amenities = $amenities, \
                 max_occupants = $max_occupants, \
                 current_occupants = 0",
            )
            .bind(("id", id_str.clone()))
            .bind(("building_name", input.building_name))
            .bind(("unit_number", input.unit_number))
            .bind(("floor", input.floor))
            .bind(("rooms", input.rooms))
            .bind((
                "status",
                apartment_status_to_string(ApartmentStatus::for_occupancy(0, max_occupants))
                    .to_string(),
            ))
            .bind(("monthly_rent", input.monthly_rent.to_string()))
            .bind((
                "amenities",
                input.amenities.into_iter().collect::<Vec<String>>(),
            ))
            .bind(("max_occupants", max_occupants))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ApartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "apartment".into(),
            id: id_str,
        })?;

        Ok(row.into_apartment(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> LeaseholdResult<Apartment> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('apartment', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "apartment".into(),
            id: id_str,
        })?;

        Ok(row.into_apartment(id)?)
    }

    async fn get_by_unit_number(&self, unit_number: &str) -> LeaseholdResult<Apartment> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM apartment \
                 WHERE unit_number = $unit_number",
            )
            .bind(("unit_number", unit_number.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApartmentRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "apartment".into(),
            id: format!("unit_number={unit_number}"),
        })?;

        Ok(row.try_into_apartment()?)
    }

    async fn update(&self, id: Uuid, input: UpdateApartment) -> LeaseholdResult<Apartment> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.building_name.is_some() {
            sets.push("building_name = $building_name");
        }
        if input.floor.is_some() {
            sets.push("floor = $floor");
        }
        if input.rooms.is_some() {
            sets.push("rooms = $rooms");
        }
        if input.monthly_rent.is_some() {
            sets.push("monthly_rent = $monthly_rent");
        }
        if input.amenities.is_some() {
            sets.push("amenities = $amenities");
        }
        if input.max_occupants.is_some() {
            sets.push("max_occupants = $max_occupants");
        }
        if input.current_occupants.is_some() {
            sets.push("current_occupants = $current_occupants");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('apartment', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(building_name) = input.building_name {
            builder = builder.bind(("building_name", building_name));
        }
        if let Some(floor) = input.floor {
            builder = builder.bind(("floor", floor));
        }
        if let Some(rooms) = input.rooms {
            builder = builder.bind(("rooms", rooms));
        }
        if let Some(monthly_rent) = input.monthly_rent {
            builder = builder.bind(("monthly_rent", monthly_rent.to_string()));
        }
        if let Some(amenities) = input.amenities {
            builder = builder.bind(("amenities", amenities.into_iter().collect::<Vec<String>>()));
        }
        if let Some(max_occupants) = input.max_occupants {
            builder = builder.bind(("max_occupants", max_occupants));
        }
        if let Some(current_occupants) = input.current_occupants {
            builder = builder.bind(("current_occupants", current_occupants));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", apartment_status_to_string(status).to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ApartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "apartment".into(),
            id: id_str,
        })?;

        Ok(row.into_apartment(id)?)
    }

    async fn adjust_occupancy(&self, id: Uuid, delta: i32) -> LeaseholdResult<Apartment> {
        let id_str = id.to_string();

        // Each statement reads the stored row, so concurrent adjustments
        // accumulate instead of overwriting one another.
        let result = self
            .db
            .query(
                "UPDATE type::record('apartment', $id) SET \
                 current_occupants = math::max([current_occupants + $delta, 0]), \
                 updated_at = time::now(); \
                 UPDATE type::record('apartment', $id) SET status = 'Occupied' \
                 WHERE current_occupants >= max_occupants; \
                 UPDATE type::record('apartment', $id) SET status = 'Available' \
                 WHERE current_occupants < max_occupants; \
                 SELECT * FROM type::record('apartment', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("delta", i64::from(delta)))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ApartmentRow> = result.take(3).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "apartment".into(),
            id: id_str,
        })?;

        Ok(row.into_apartment(id)?)
    }

    async fn delete(&self, id: Uuid) -> LeaseholdResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query("DELETE type::record('apartment', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ApartmentRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "apartment".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> LeaseholdResult<PaginatedResult<Apartment>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM apartment GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM apartment \
                 ORDER BY created_at ASC, unit_number ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApartmentRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_apartment())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_with_vacancy(&self) -> LeaseholdResult<Vec<Apartment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM apartment \
                 WHERE current_occupants < max_occupants \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ApartmentRowWithId> = result.take(0).map_err(DbError::from)?;

        let apartments = rows
            .into_iter()
            .map(|row| row.try_into_apartment())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(apartments)
    }
}
