//! Additive schema reconciliation
//!
//! Declarative table definitions in code are the single source of truth;
//! this module aligns the database with them without ever destroying data.
//!
//! Per table, three steps:
//! 1. `CREATE TABLE IF NOT EXISTS` generated from the declared columns
//! 2. Introspect actual columns via `PRAGMA table_info`, `ALTER TABLE ...
//!    ADD COLUMN` anything missing (additive only; type mismatches are
//!    logged, never auto-fixed)
//! 3. Ensure the declared indexes exist; index failures are logged and
//!    swallowed, the service runs degraded without them
//!
//! Steps 1 and 2 are fatal on failure: the service cannot serve requests
//! without its tables and columns.

use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default_value: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            unique: false,
            default_value: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// DDL fragment for CREATE TABLE
    fn create_sql(&self) -> String {
        let mut sql = format!("\"{}\" {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default_value {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        sql
    }
}

/// Declared schema for one database table
pub trait TableSchema {
    /// Table name in the database
    fn table_name() -> &'static str;

    /// Expected column definitions (order matters for new table creation)
    fn expected_columns() -> Vec<ColumnDefinition>;
}

/// Create the table from its declaration if it does not exist yet.
pub async fn create_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
    let columns: Vec<String> = T::expected_columns()
        .iter()
        .map(ColumnDefinition::create_sql)
        .collect();

    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        T::table_name(),
        columns.join(", ")
    );

    sqlx::query(&sql).execute(pool).await?;

    Ok(())
}

/// Check if a table exists
pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name = ?
        )
        "#,
    )
    .bind(table_name)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Actual column names and types, in database order
pub async fn table_columns(pool: &SqlitePool, table_name: &str) -> Result<Vec<(String, String)>> {
    let query = format!("PRAGMA table_info({})", table_name);
    let rows = sqlx::query(&query).fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("name"), row.get("type")))
        .collect())
}

/// Align an existing table with its declaration by adding missing columns.
///
/// Columns are compared by name, case-insensitively (SQLite identifier
/// semantics). A column present with a different type affinity is reported
/// and left alone; fixing it needs a manual migration.
pub async fn reconcile_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
    let table_name = T::table_name();

    if !table_exists(pool, table_name).await? {
        // create_table should have run first; recover rather than fail
        warn!("Table '{}' missing during reconcile, creating it", table_name);
        return create_table::<T>(pool).await;
    }

    let actual = table_columns(pool, table_name).await?;

    for expected in T::expected_columns() {
        match actual
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&expected.name))
        {
            Some((name, actual_type)) => {
                if !types_compatible(&expected.sql_type, actual_type) {
                    warn!(
                        "Type mismatch in {}.{}: expected '{}', found '{}'. \
                         Manual migration required.",
                        table_name, name, expected.sql_type, actual_type
                    );
                }
            }
            None => add_column(pool, table_name, &expected).await?,
        }
    }

    Ok(())
}

/// Add one missing column via ALTER TABLE ADD COLUMN.
///
/// SQLite cannot add PRIMARY KEY or UNIQUE columns this way, and NOT NULL
/// only with a default; such columns are added in relaxed form with a
/// warning. In practice only plain nullable columns are ever added here.
async fn add_column(pool: &SqlitePool, table: &str, column: &ColumnDefinition) -> Result<()> {
    if column.primary_key || column.unique || (column.not_null && column.default_value.is_none()) {
        warn!(
            "Column {}.{} declared with constraints ALTER TABLE cannot add; \
             adding in relaxed form",
            table, column.name
        );
    }

    let mut sql = format!(
        "ALTER TABLE {} ADD COLUMN \"{}\" {}",
        table, column.name, column.sql_type
    );
    if let Some(default) = &column.default_value {
        sql.push_str(&format!(" DEFAULT {}", default));
    }

    info!("Adding column: {}.{} ({})", table, column.name, column.sql_type);

    match sqlx::query(&sql).execute(pool).await {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            // Concurrent initialization added it first
            info!("Column {}.{} already added", table, column.name);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Ensure a single-column index exists. Never fails: index creation
/// problems are logged and the service continues without the index.
pub async fn ensure_index(pool: &SqlitePool, index_name: &str, table: &str, column: &str) {
    let exists: std::result::Result<bool, sqlx::Error> = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='index' AND name = ?
        )
        "#,
    )
    .bind(index_name)
    .fetch_one(pool)
    .await;

    match exists {
        Ok(true) => return,
        Ok(false) => {}
        Err(e) => {
            warn!("Failed to check index '{}': {}", index_name, e);
            return;
        }
    }

    let sql = format!("CREATE INDEX {} ON {} (\"{}\")", index_name, table, column);
    match sqlx::query(&sql).execute(pool).await {
        Ok(_) => info!("Index '{}' created", index_name),
        Err(e) => warn!("Failed to create index '{}' on '{}': {}", index_name, table, e),
    }
}

/// SQL type compatibility under SQLite affinity rules
fn types_compatible(expected: &str, actual: &str) -> bool {
    let exp = expected.to_uppercase();
    let act = actual.to_uppercase();

    if exp == act {
        return true;
    }

    let int = |t: &str| t.contains("INT");
    let text = |t: &str| t.contains("TEXT") || t.contains("CHAR") || t.contains("CLOB");
    let real = |t: &str| t.contains("REAL") || t.contains("FLOAT") || t.contains("DOUBLE");

    (int(&exp) && int(&act)) || (text(&exp) && text(&act)) || (real(&exp) && real(&act))
}
