//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs, decimals and
//! calendar dates are stored as strings; enums are stored as strings
//! with ASSERT constraints.
//!
//! `current_occupants` is deliberately not asserted against
//! `max_occupants`: the cap is enforced by the tenancy coordinator, and
//! the store must be able to record the overshoot produced by concurrent
//! assignments so that reconciliation can see it.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct AppliedMigration {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "apartments_tenancies_users",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Apartments
-- =======================================================================
DEFINE TABLE apartment SCHEMAFULL;
DEFINE FIELD building_name ON TABLE apartment TYPE string;
DEFINE FIELD unit_number ON TABLE apartment TYPE string;
DEFINE FIELD floor ON TABLE apartment TYPE int;
DEFINE FIELD rooms ON TABLE apartment TYPE int ASSERT $value >= 1;
DEFINE FIELD status ON TABLE apartment TYPE string \
    ASSERT $value IN ['Available', 'Occupied'];
DEFINE FIELD monthly_rent ON TABLE apartment TYPE string;
DEFINE FIELD amenities ON TABLE apartment TYPE array<string> DEFAULT [];
DEFINE FIELD max_occupants ON TABLE apartment TYPE int \
    ASSERT $value >= 1;
DEFINE FIELD current_occupants ON TABLE apartment TYPE int \
    DEFAULT 0 ASSERT $value >= 0;
DEFINE FIELD created_at ON TABLE apartment TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE apartment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_apartment_unit_number ON TABLE apartment \
    COLUMNS unit_number UNIQUE;

-- =======================================================================
-- Users (provisioned by the identity flow)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD display_name ON TABLE user TYPE string;
DEFINE FIELD apartment_id ON TABLE user TYPE option<string>;
DEFINE FIELD lease_start_date ON TABLE user TYPE option<string>;
DEFINE FIELD lease_end_date ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Tenancies (user <-> apartment join records, never deleted)
-- =======================================================================
DEFINE TABLE tenancy SCHEMAFULL;
DEFINE FIELD user_id ON TABLE tenancy TYPE string;
DEFINE FIELD apartment_id ON TABLE tenancy TYPE string;
DEFINE FIELD status ON TABLE tenancy TYPE string \
    ASSERT $value IN ['Pending', 'Active', 'Inactive'];
DEFINE FIELD role ON TABLE tenancy TYPE string \
    ASSERT $value IN ['Primary', 'Secondary'];
DEFINE FIELD lease_start_date ON TABLE tenancy TYPE string;
DEFINE FIELD lease_end_date ON TABLE tenancy TYPE string;
DEFINE FIELD monthly_rent ON TABLE tenancy TYPE string;
DEFINE FIELD created_at ON TABLE tenancy TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenancy TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenancy_user ON TABLE tenancy COLUMNS user_id;
DEFINE INDEX idx_tenancy_apartment ON TABLE tenancy COLUMNS apartment_id;
";

// -----------------------------------------------------------------------
// Migration runner
// -----------------------------------------------------------------------

/// Apply all migrations newer than the highest recorded version.
///
/// The `_migration` tracking table is created on first run. Re-running
/// against an up-to-date database is a no-op.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let applied: Vec<AppliedMigration> = result.take(0)?;
    let current_version = applied.first().map(|m| m.version).unwrap_or(0);
    debug!(current_version, "Current schema version");

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version)
    {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "could not record v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    Ok(())
}

/// Raw schema DDL for version 1, for tests that bypass the runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
