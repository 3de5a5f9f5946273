//! Schema version tracking
//!
//! The `schema_version` table records which schema revision was last
//! reconciled against this database. Reconciliation runs only when the
//! stored version is behind `SCHEMA_VERSION`, so steady-state boots skip
//! table introspection entirely.
//!
//! Bump `SCHEMA_VERSION` whenever a declared table schema in
//! `table_schemas.rs` changes.

use crate::Result;
use sqlx::SqlitePool;
use tracing::warn;

/// Current schema revision.
///
/// v1: record tables + user_audio, email indexes
/// v2: user_audio content fields `email_1`, `email_2`, `salesletter`
pub const SCHEMA_VERSION: i32 = 2;

pub async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Latest recorded version, or 0 for a fresh database.
pub async fn schema_version(pool: &SqlitePool) -> Result<i32> {
    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

pub async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Whether the stored version requires a reconcile pass.
pub fn needs_reconcile(stored: i32) -> bool {
    if stored > SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({}); \
             proceeding without reconciliation",
            stored, SCHEMA_VERSION
        );
        return false;
    }
    stored < SCHEMA_VERSION
}
