//! Table schema definitions
//!
//! Single source of truth for the database shape. The four record tables
//! share one column set; `user_audio` carries the profile fields.
//!
//! Changing anything here requires bumping `migrations::SCHEMA_VERSION` so
//! already-deployed databases get reconciled on their next boot.

use crate::db::reconcile::{self, ColumnDefinition, TableSchema};
use crate::Result;
use sqlx::SqlitePool;

/// Shared shape of the four record tables
fn record_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("user_id", "TEXT").primary_key(),
        ColumnDefinition::new("user_email", "TEXT").not_null().unique(),
        ColumnDefinition::new("text", "TEXT").not_null(),
        ColumnDefinition::new("created_at", "TIMESTAMP")
            .not_null()
            .default("CURRENT_TIMESTAMP"),
        ColumnDefinition::new("booking_button_name", "TEXT"),
        ColumnDefinition::new("booking_button_redirection", "TEXT"),
    ]
}

pub struct PrognosticTable;

impl TableSchema for PrognosticTable {
    fn table_name() -> &'static str {
        "prognostic"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        record_columns()
    }
}

pub struct PrognosticPsychTable;

impl TableSchema for PrognosticPsychTable {
    fn table_name() -> &'static str {
        "prognostic_psych"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        record_columns()
    }
}

pub struct ResultsOneTable;

impl TableSchema for ResultsOneTable {
    fn table_name() -> &'static str {
        "results_one"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        record_columns()
    }
}

pub struct ResultsTwoTable;

impl TableSchema for ResultsTwoTable {
    fn table_name() -> &'static str {
        "results_two"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        record_columns()
    }
}

/// Profile table. Column capitalization is historical and part of the wire
/// format; do not normalize it.
pub struct UserAudioTable;

impl TableSchema for UserAudioTable {
    fn table_name() -> &'static str {
        "user_audio"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        let mut columns = vec![
            ColumnDefinition::new("id", "TEXT").primary_key(),
            ColumnDefinition::new("user_email", "TEXT").not_null().unique(),
            ColumnDefinition::new("audio_link", "TEXT"),
            ColumnDefinition::new("audio_link_two", "TEXT"),
        ];
        for name in PROFILE_CONTENT_COLUMNS {
            columns.push(ColumnDefinition::new(*name, "TEXT"));
        }
        columns
    }
}

/// The independently nullable profile text columns, in schema order
pub const PROFILE_CONTENT_COLUMNS: &[&str] = &[
    "exit_message",
    "headline",
    "company_name",
    "Industry",
    "Products_services",
    "Business_description",
    "primary_goal",
    "target_audience",
    "pain_points",
    "offer_name",
    "offer_price",
    "offer_description",
    "primary_benefits",
    "offer_goal",
    "Offer_topic",
    "target_url",
    "testimonials",
    "email_1",
    "email_2",
    "salesletter",
];

/// Email index per table, named after the table it covers
const EMAIL_INDEXES: &[(&str, &str)] = &[
    ("idx_user_email_prognostic", "prognostic"),
    ("idx_user_email_prognostic_psych", "prognostic_psych"),
    ("idx_user_email_results_one", "results_one"),
    ("idx_user_email_results_two", "results_two"),
    ("idx_user_email_user_audio", "user_audio"),
];

/// Create every required table. Failure is fatal for startup.
pub async fn create_all_tables(pool: &SqlitePool) -> Result<()> {
    reconcile::create_table::<PrognosticTable>(pool).await?;
    reconcile::create_table::<PrognosticPsychTable>(pool).await?;
    reconcile::create_table::<ResultsOneTable>(pool).await?;
    reconcile::create_table::<ResultsTwoTable>(pool).await?;
    reconcile::create_table::<UserAudioTable>(pool).await?;

    Ok(())
}

/// Add any declared columns missing from existing tables. Failure is fatal.
pub async fn reconcile_all_tables(pool: &SqlitePool) -> Result<()> {
    reconcile::reconcile_table::<PrognosticTable>(pool).await?;
    reconcile::reconcile_table::<PrognosticPsychTable>(pool).await?;
    reconcile::reconcile_table::<ResultsOneTable>(pool).await?;
    reconcile::reconcile_table::<ResultsTwoTable>(pool).await?;
    reconcile::reconcile_table::<UserAudioTable>(pool).await?;

    Ok(())
}

/// Ensure the per-table email indexes. Failures are logged and non-fatal;
/// lookups still work through the UNIQUE constraint.
pub async fn ensure_email_indexes(pool: &SqlitePool) {
    for (index_name, table) in EMAIL_INDEXES {
        reconcile::ensure_index(pool, index_name, table, "user_email").await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_record_table_shape() {
        let columns = PrognosticTable::expected_columns();

        assert!(columns.iter().any(|c| c.name == "user_id" && c.primary_key));
        assert!(columns
            .iter()
            .any(|c| c.name == "user_email" && c.not_null && c.unique));
        assert!(columns.iter().any(|c| c.name == "text" && c.not_null));
        assert!(columns
            .iter()
            .any(|c| c.name == "created_at"
                && c.default_value.as_deref() == Some("CURRENT_TIMESTAMP")));
    }

    #[tokio::test]
    async fn test_all_record_tables_share_shape() {
        assert_eq!(
            PrognosticTable::expected_columns(),
            PrognosticPsychTable::expected_columns()
        );
        assert_eq!(
            ResultsOneTable::expected_columns(),
            ResultsTwoTable::expected_columns()
        );
    }

    #[tokio::test]
    async fn test_user_audio_shape() {
        let columns = UserAudioTable::expected_columns();

        // id + email + 2 links + 20 content fields
        assert_eq!(columns.len(), 24);
        assert!(columns.iter().any(|c| c.name == "Industry"));
        assert!(columns.iter().any(|c| c.name == "salesletter"));
    }

    #[tokio::test]
    async fn test_create_all_tables() {
        let pool = setup_test_db().await;

        create_all_tables(&pool).await.unwrap();

        for table in [
            "prognostic",
            "prognostic_psych",
            "results_one",
            "results_two",
            "user_audio",
        ] {
            assert!(
                reconcile::table_exists(&pool, table).await.unwrap(),
                "missing table {}",
                table
            );
        }
    }

    #[tokio::test]
    async fn test_legacy_user_audio_gains_new_columns() {
        let pool = setup_test_db().await;

        // Shape before the salesletter generation fields existed
        sqlx::query(
            r#"
            CREATE TABLE user_audio (
                id TEXT PRIMARY KEY,
                user_email TEXT NOT NULL UNIQUE,
                audio_link TEXT,
                audio_link_two TEXT,
                exit_message TEXT,
                headline TEXT
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        reconcile_all_tables(&pool).await.unwrap();

        let columns = reconcile::table_columns(&pool, "user_audio").await.unwrap();
        let names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"email_1"));
        assert!(names.contains(&"email_2"));
        assert!(names.contains(&"salesletter"));
        assert!(names.contains(&"Offer_topic"));
    }

    #[tokio::test]
    async fn test_email_indexes_created() {
        let pool = setup_test_db().await;

        create_all_tables(&pool).await.unwrap();
        ensure_email_indexes(&pool).await;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name LIKE 'idx_user_email_%'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 5);
    }
}
