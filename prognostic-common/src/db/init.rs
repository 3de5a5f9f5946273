//! Database initialization
//!
//! Opens (or creates) the SQLite database and brings its schema up to date.
//! Table creation and column addition failures are fatal here; a missing
//! email index is not (see `table_schemas::ensure_email_indexes`).

use crate::db::{migrations, table_schemas};
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

/// Open the connection pool for `db_url` and configure session PRAGMAs.
///
/// For file-backed URLs the parent directory is created if missing, so a
/// fresh checkout can start with zero setup.
pub async fn connect(db_url: &str) -> Result<SqlitePool> {
    if let Some(path) = file_path_of(db_url) {
        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(1)
        .connect(db_url)
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows concurrent readers alongside one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    Ok(pool)
}

/// Open the database and reconcile its schema. The normal startup entry point.
pub async fn init_database(db_url: &str) -> Result<SqlitePool> {
    let pool = connect(db_url).await?;
    info!("Database opened: {}", db_url);

    ensure_schema(&pool).await?;

    Ok(pool)
}

/// Bring the schema up to the current revision.
///
/// Idempotent and additive. Gated on the stored schema version: a boot that
/// finds the schema current skips all introspection.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    migrations::create_schema_version_table(pool).await?;

    let stored = migrations::schema_version(pool).await?;
    if !migrations::needs_reconcile(stored) {
        info!("Database schema is up to date (v{})", stored);
        return Ok(());
    }

    info!(
        "Reconciling database schema: v{} -> v{}",
        stored,
        migrations::SCHEMA_VERSION
    );

    table_schemas::create_all_tables(pool).await?;
    table_schemas::reconcile_all_tables(pool).await?;
    table_schemas::ensure_email_indexes(pool).await;

    migrations::set_schema_version(pool, migrations::SCHEMA_VERSION).await?;
    info!("Schema reconciliation complete");

    Ok(())
}

/// Extract the filesystem path from a `sqlite://` URL, if it has one.
fn file_path_of(db_url: &str) -> Option<String> {
    let rest = db_url.strip_prefix("sqlite://").or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(path.to_string())
}
