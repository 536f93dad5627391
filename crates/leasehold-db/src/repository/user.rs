//! SurrealDB implementation of [`UserRepository`].
//!
//! Only the fields Leasehold owns are writable here: the display name,
//! the apartment back-reference and the mirrored lease dates.

use chrono::{DateTime, Utc};
use leasehold_core::error::LeaseholdResult;
use leasehold_core::models::user::{CreateUser, UpdateUser, User};
use leasehold_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::convert::{date_to_string, parse_optional_date, parse_optional_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    display_name: String,
    apartment_id: Option<String>,
    lease_start_date: Option<String>,
    lease_end_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            email: self.email,
            display_name: self.display_name,
            apartment_id: parse_optional_uuid("apartment", self.apartment_id)?,
            lease_start_date: parse_optional_date("lease_start_date", self.lease_start_date)?,
            lease_end_date: parse_optional_date("lease_end_date", self.lease_end_date)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> LeaseholdResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, display_name = $display_name, \
                 apartment_id = NONE, \
                 lease_start_date = NONE, lease_end_date = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("display_name", input.display_name))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> LeaseholdResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> LeaseholdResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.display_name.is_some() {
            sets.push("display_name = $display_name");
        }
        if input.apartment_id.is_some() {
            sets.push("apartment_id = $apartment_id");
        }
        if input.lease_start_date.is_some() {
            sets.push("lease_start_date = $lease_start_date");
        }
        if input.lease_end_date.is_some() {
            sets.push("lease_end_date = $lease_end_date");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('user', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(display_name) = input.display_name {
            builder = builder.bind(("display_name", display_name));
        }
        // Option<Option<_>>: Some(Some(v)) = set, Some(None) = clear (binds NONE).
        if let Some(apartment_id) = input.apartment_id {
            builder = builder.bind(("apartment_id", apartment_id.map(|id| id.to_string())));
        }
        if let Some(start) = input.lease_start_date {
            builder = builder.bind(("lease_start_date", start.map(date_to_string)));
        }
        if let Some(end) = input.lease_end_date {
            builder = builder.bind(("lease_end_date", end.map(date_to_string)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }
}
