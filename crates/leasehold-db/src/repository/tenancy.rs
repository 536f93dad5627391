//! SurrealDB implementation of [`TenancyRepository`].

use chrono::{DateTime, Utc};
use leasehold_core::error::LeaseholdResult;
use leasehold_core::models::tenancy::{CreateTenancy, Tenancy, TenancyStatus, UpdateTenancy};
use leasehold_core::repository::TenancyRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::convert::{
    date_to_string, parse_date, parse_decimal, parse_role, parse_tenancy_status, parse_uuid,
    role_to_string, tenancy_status_to_string,
};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TenancyRow {
    user_id: String,
    apartment_id: String,
    status: String,
    role: String,
    lease_start_date: String,
    lease_end_date: String,
    monthly_rent: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TenancyRowWithId {
    record_id: String,
    user_id: String,
    apartment_id: String,
    status: String,
    role: String,
    lease_start_date: String,
    lease_end_date: String,
    monthly_rent: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn row_to_tenancy(row: TenancyRow, id: Uuid) -> Result<Tenancy, DbError> {
    Ok(Tenancy {
        id,
        user_id: parse_uuid("user", &row.user_id)?,
        apartment_id: parse_uuid("apartment", &row.apartment_id)?,
        status: parse_tenancy_status(&row.status)?,
        role: parse_role(&row.role)?,
        lease_start_date: parse_date("lease_start_date", &row.lease_start_date)?,
        lease_end_date: parse_date("lease_end_date", &row.lease_end_date)?,
        monthly_rent: parse_decimal("monthly_rent", &row.monthly_rent)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl TenancyRowWithId {
    fn try_into_tenancy(self) -> Result<Tenancy, DbError> {
        let id = parse_uuid("tenancy", &self.record_id)?;
        row_to_tenancy(
            TenancyRow {
                user_id: self.user_id,
                apartment_id: self.apartment_id,
                status: self.status,
                role: self.role,
                lease_start_date: self.lease_start_date,
                lease_end_date: self.lease_end_date,
                monthly_rent: self.monthly_rent,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the Tenancy repository.
#[derive(Clone)]
pub struct SurrealTenancyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenancyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Equality query on one reference field with an optional status
    /// filter. `field` is always a compile-time column name.
    async fn list_by_reference(
        &self,
        field: &'static str,
        value: Uuid,
        status: Option<TenancyStatus>,
    ) -> Result<Vec<Tenancy>, DbError> {
        let mut query = format!(
            "SELECT meta::id(id) AS record_id, * FROM tenancy \
             WHERE {field} = $value"
        );
        if status.is_some() {
            query.push_str(" AND status = $status");
        }
        query.push_str(" ORDER BY created_at ASC");

        let mut builder = self.db.query(query).bind(("value", value.to_string()));
        if let Some(status) = status {
            builder = builder.bind(("status", tenancy_status_to_string(status).to_string()));
        }

        let mut result = builder.await?;
        let rows: Vec<TenancyRowWithId> = result.take(0)?;

        rows.into_iter()
            .map(|row| row.try_into_tenancy())
            .collect::<Result<Vec<_>, DbError>>()
    }
}

impl<C: Connection> TenancyRepository for SurrealTenancyRepository<C> {
    async fn create(&self, input: CreateTenancy) -> LeaseholdResult<Tenancy> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tenancy', $id) SET \
                 user_id = $user_id, apartment_id = $apartment_id, \
                 status = $status, role = $role, \
                 lease_start_date = $lease_start_date, \
                 lease_end_date = $lease_end_date, \
                 monthly_rent = $monthly_rent",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("apartment_id", input.apartment_id.to_string()))
            .bind(("status", tenancy_status_to_string(input.status).to_string()))
            .bind(("role", role_to_string(input.role).to_string()))
            .bind(("lease_start_date", date_to_string(input.lease_start_date)))
            .bind(("lease_end_date", date_to_string(input.lease_end_date)))
            .bind(("monthly_rent", input.monthly_rent.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenancyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenancy".into(),
            id: id_str,
        })?;

        Ok(row_to_tenancy(row, id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> LeaseholdResult<Tenancy> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenancy', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenancyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenancy".into(),
            id: id_str,
        })?;

        Ok(row_to_tenancy(row, id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenancy) -> LeaseholdResult<Tenancy> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.lease_start_date.is_some() {
            sets.push("lease_start_date = $lease_start_date");
        }
        if input.lease_end_date.is_some() {
            sets.push("lease_end_date = $lease_end_date");
        }
        if input.monthly_rent.is_some() {
            sets.push("monthly_rent = $monthly_rent");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('tenancy', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(status) = input.status {
            builder = builder.bind(("status", tenancy_status_to_string(status).to_string()));
        }
        if let Some(role) = input.role {
            builder = builder.bind(("role", role_to_string(role).to_string()));
        }
        if let Some(start) = input.lease_start_date {
            builder = builder.bind(("lease_start_date", date_to_string(start)));
        }
        if let Some(end) = input.lease_end_date {
            builder = builder.bind(("lease_end_date", date_to_string(end)));
        }
        if let Some(monthly_rent) = input.monthly_rent {
            builder = builder.bind(("monthly_rent", monthly_rent.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenancyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenancy".into(),
            id: id_str,
        })?;

        Ok(row_to_tenancy(row, id)?)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<TenancyStatus>,
    ) -> LeaseholdResult<Vec<Tenancy>> {
        Ok(self.list_by_reference("user_id", user_id, status).await?)
    }

    async fn list_by_apartment(
        &self,
        apartment_id: Uuid,
        status: Option<TenancyStatus>,
    ) -> LeaseholdResult<Vec<Tenancy>> {
        Ok(self
            .list_by_reference("apartment_id", apartment_id, status)
            .await?)
    }
}
