//! Record and profile store
//!
//! One generic upsert/fetch/delete implementation shared by all four record
//! tables, parameterized by `RecordKind`, plus the profile equivalents for
//! `user_audio`.
//!
//! Each operation is a single transaction against one table. There is no
//! application-level locking: concurrent upserts for the same new email race
//! at the store, and the loser's unique-constraint violation surfaces as
//! `Error::Database` for the caller to report.

use crate::db::models::{AudioProfile, Record};
use crate::Result;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

/// The four record resources sharing the upsert/fetch contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Prognostic,
    PrognosticPsych,
    ResultsOne,
    ResultsTwo,
}

impl RecordKind {
    /// Backing table
    pub fn table_name(self) -> &'static str {
        match self {
            RecordKind::Prognostic => "prognostic",
            RecordKind::PrognosticPsych => "prognostic_psych",
            RecordKind::ResultsOne => "results_one",
            RecordKind::ResultsTwo => "results_two",
        }
    }

    /// Label used in response messages ("User psych updated successfully!")
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Prognostic => "User",
            RecordKind::PrognosticPsych => "User psych",
            RecordKind::ResultsOne => "User one",
            RecordKind::ResultsTwo => "User two",
        }
    }
}

/// Fields written by a record upsert. `text` is the already-rendered HTML.
#[derive(Debug, Clone)]
pub struct RecordInput {
    pub user_email: String,
    pub text: String,
    pub booking_button_name: Option<String>,
    pub booking_button_redirection: Option<String>,
}

/// What an upsert did, carrying the row's identifier either way
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(String),
    Updated(String),
}

impl UpsertOutcome {
    pub fn user_id(&self) -> &str {
        match self {
            UpsertOutcome::Created(id) | UpsertOutcome::Updated(id) => id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

/// Insert-if-absent-else-overwrite, keyed by email.
///
/// The existing row keeps its `user_id` and `created_at`; `text` and both
/// button fields are overwritten with the input's values (absent buttons
/// become NULL). A fresh row gets a server-generated UUIDv4. Any failure
/// rolls the transaction back fully.
pub async fn upsert_record(
    pool: &SqlitePool,
    kind: RecordKind,
    input: &RecordInput,
) -> Result<UpsertOutcome> {
    let mut tx = pool.begin().await?;

    let sql = format!(
        "SELECT user_id FROM {} WHERE user_email = ?",
        kind.table_name()
    );
    let existing: Option<String> = sqlx::query_scalar(&sql)
        .bind(&input.user_email)
        .fetch_optional(&mut *tx)
        .await?;

    let outcome = match existing {
        Some(user_id) => {
            let sql = format!(
                "UPDATE {} SET text = ?, booking_button_name = ?, \
                 booking_button_redirection = ? WHERE user_email = ?",
                kind.table_name()
            );
            sqlx::query(&sql)
                .bind(&input.text)
                .bind(&input.booking_button_name)
                .bind(&input.booking_button_redirection)
                .bind(&input.user_email)
                .execute(&mut *tx)
                .await?;
            UpsertOutcome::Updated(user_id)
        }
        None => {
            let user_id = Uuid::new_v4().to_string();
            insert_record_row(&mut tx, kind, &user_id, input).await?;
            UpsertOutcome::Created(user_id)
        }
    };

    tx.commit().await?;
    Ok(outcome)
}

async fn insert_record_row(
    conn: &mut SqliteConnection,
    kind: RecordKind,
    user_id: &str,
    input: &RecordInput,
) -> Result<()> {
    let sql = format!(
        "INSERT INTO {} (user_id, user_email, text, booking_button_name, \
         booking_button_redirection) VALUES (?, ?, ?, ?, ?)",
        kind.table_name()
    );
    sqlx::query(&sql)
        .bind(user_id)
        .bind(&input.user_email)
        .bind(&input.text)
        .bind(&input.booking_button_name)
        .bind(&input.booking_button_redirection)
        .execute(conn)
        .await?;

    Ok(())
}

/// Exact-match lookup by email
pub async fn fetch_record(
    pool: &SqlitePool,
    kind: RecordKind,
    user_email: &str,
) -> Result<Option<Record>> {
    let sql = format!(
        "SELECT user_id, user_email, text, created_at, booking_button_name, \
         booking_button_redirection FROM {} WHERE user_email = ?",
        kind.table_name()
    );
    let record = sqlx::query_as::<_, Record>(&sql)
        .bind(user_email)
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

/// Delete by email. Returns whether a row existed.
pub async fn delete_record(pool: &SqlitePool, kind: RecordKind, user_email: &str) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE user_email = ?", kind.table_name());
    let result = sqlx::query(&sql).bind(user_email).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

/// Fields written by a profile upsert.
///
/// The plain `String` fields default to empty at the API boundary: a field
/// absent from the request is written as `""`, never preserved.
#[derive(Debug, Clone, Default)]
pub struct AudioProfileInput {
    pub user_email: String,
    pub audio_link: String,
    pub audio_link_two: Option<String>,
    pub exit_message: String,
    pub headline: String,
    pub company_name: String,
    pub industry: String,
    pub products_services: String,
    pub business_description: String,
    pub primary_goal: String,
    pub target_audience: String,
    pub pain_points: String,
    pub offer_name: String,
    pub offer_price: String,
    pub offer_description: String,
    pub primary_benefits: String,
    pub offer_goal: String,
    pub offer_topic: String,
    pub target_url: String,
    pub testimonials: String,
    pub email_1: String,
    pub email_2: String,
    pub salesletter: String,
}

/// Upsert the audio/profile row for an email. Same transaction and
/// overwrite discipline as `upsert_record`, across all content fields.
pub async fn upsert_profile(pool: &SqlitePool, input: &AudioProfileInput) -> Result<UpsertOutcome> {
    let mut tx = pool.begin().await?;

    let existing: Option<String> =
        sqlx::query_scalar("SELECT id FROM user_audio WHERE user_email = ?")
            .bind(&input.user_email)
            .fetch_optional(&mut *tx)
            .await?;

    let outcome = match existing {
        Some(id) => {
            sqlx::query(
                r#"
                UPDATE user_audio SET
                    audio_link = ?, audio_link_two = ?, exit_message = ?,
                    headline = ?, company_name = ?, "Industry" = ?,
                    "Products_services" = ?, "Business_description" = ?,
                    primary_goal = ?, target_audience = ?, pain_points = ?,
                    offer_name = ?, offer_price = ?, offer_description = ?,
                    primary_benefits = ?, offer_goal = ?, "Offer_topic" = ?,
                    target_url = ?, testimonials = ?, email_1 = ?,
                    email_2 = ?, salesletter = ?
                WHERE user_email = ?
                "#,
            )
            .bind(&input.audio_link)
            .bind(&input.audio_link_two)
            .bind(&input.exit_message)
            .bind(&input.headline)
            .bind(&input.company_name)
            .bind(&input.industry)
            .bind(&input.products_services)
            .bind(&input.business_description)
            .bind(&input.primary_goal)
            .bind(&input.target_audience)
            .bind(&input.pain_points)
            .bind(&input.offer_name)
            .bind(&input.offer_price)
            .bind(&input.offer_description)
            .bind(&input.primary_benefits)
            .bind(&input.offer_goal)
            .bind(&input.offer_topic)
            .bind(&input.target_url)
            .bind(&input.testimonials)
            .bind(&input.email_1)
            .bind(&input.email_2)
            .bind(&input.salesletter)
            .bind(&input.user_email)
            .execute(&mut *tx)
            .await?;
            UpsertOutcome::Updated(id)
        }
        None => {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO user_audio (
                    id, user_email, audio_link, audio_link_two, exit_message,
                    headline, company_name, "Industry", "Products_services",
                    "Business_description", primary_goal, target_audience,
                    pain_points, offer_name, offer_price, offer_description,
                    primary_benefits, offer_goal, "Offer_topic", target_url,
                    testimonials, email_1, email_2, salesletter
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&input.user_email)
            .bind(&input.audio_link)
            .bind(&input.audio_link_two)
            .bind(&input.exit_message)
            .bind(&input.headline)
            .bind(&input.company_name)
            .bind(&input.industry)
            .bind(&input.products_services)
            .bind(&input.business_description)
            .bind(&input.primary_goal)
            .bind(&input.target_audience)
            .bind(&input.pain_points)
            .bind(&input.offer_name)
            .bind(&input.offer_price)
            .bind(&input.offer_description)
            .bind(&input.primary_benefits)
            .bind(&input.offer_goal)
            .bind(&input.offer_topic)
            .bind(&input.target_url)
            .bind(&input.testimonials)
            .bind(&input.email_1)
            .bind(&input.email_2)
            .bind(&input.salesletter)
            .execute(&mut *tx)
            .await?;
            UpsertOutcome::Created(id)
        }
    };

    tx.commit().await?;
    Ok(outcome)
}

/// Exact-match profile lookup by email
pub async fn fetch_profile(pool: &SqlitePool, user_email: &str) -> Result<Option<AudioProfile>> {
    let profile = sqlx::query_as::<_, AudioProfile>("SELECT * FROM user_audio WHERE user_email = ?")
        .bind(user_email)
        .fetch_optional(pool)
        .await?;

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::ensure_schema;
    use crate::Error;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    fn sample_input(email: &str) -> RecordInput {
        RecordInput {
            user_email: email.to_string(),
            text: "<strong>Hi</strong>".to_string(),
            booking_button_name: Some("Book".to_string()),
            booking_button_redirection: Some("https://example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates_with_same_id() {
        let pool = setup_test_db().await;

        let first = upsert_record(&pool, RecordKind::Prognostic, &sample_input("a@x.com"))
            .await
            .unwrap();
        assert!(first.is_created());

        let mut changed = sample_input("a@x.com");
        changed.text = "replaced".to_string();
        let second = upsert_record(&pool, RecordKind::Prognostic, &changed)
            .await
            .unwrap();

        assert!(!second.is_created());
        assert_eq!(first.user_id(), second.user_id());

        let row = fetch_record(&pool, RecordKind::Prognostic, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.text, "replaced");
    }

    #[tokio::test]
    async fn test_update_overwrites_absent_buttons_with_null() {
        let pool = setup_test_db().await;

        upsert_record(&pool, RecordKind::Prognostic, &sample_input("a@x.com"))
            .await
            .unwrap();

        let bare = RecordInput {
            user_email: "a@x.com".to_string(),
            text: "v2".to_string(),
            booking_button_name: None,
            booking_button_redirection: None,
        };
        upsert_record(&pool, RecordKind::Prognostic, &bare)
            .await
            .unwrap();

        let row = fetch_record(&pool, RecordKind::Prognostic, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.booking_button_name, None);
        assert_eq!(row.booking_button_redirection, None);
    }

    #[tokio::test]
    async fn test_created_at_survives_update() {
        let pool = setup_test_db().await;

        upsert_record(&pool, RecordKind::Prognostic, &sample_input("a@x.com"))
            .await
            .unwrap();
        let before = fetch_record(&pool, RecordKind::Prognostic, "a@x.com")
            .await
            .unwrap()
            .unwrap();

        upsert_record(&pool, RecordKind::Prognostic, &sample_input("a@x.com"))
            .await
            .unwrap();
        let after = fetch_record(&pool, RecordKind::Prognostic, "a@x.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(before.created_at, after.created_at);
    }

    #[tokio::test]
    async fn test_kinds_are_isolated() {
        let pool = setup_test_db().await;

        upsert_record(&pool, RecordKind::Prognostic, &sample_input("a@x.com"))
            .await
            .unwrap();

        let other = fetch_record(&pool, RecordKind::ResultsOne, "a@x.com")
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_fetch_missing_returns_none() {
        let pool = setup_test_db().await;

        let row = fetch_record(&pool, RecordKind::ResultsTwo, "nobody@x.com")
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_delete_record() {
        let pool = setup_test_db().await;

        upsert_record(&pool, RecordKind::PrognosticPsych, &sample_input("a@x.com"))
            .await
            .unwrap();

        assert!(delete_record(&pool, RecordKind::PrognosticPsych, "a@x.com")
            .await
            .unwrap());
        assert!(!delete_record(&pool, RecordKind::PrognosticPsych, "a@x.com")
            .await
            .unwrap());

        let row = fetch_record(&pool, RecordKind::PrognosticPsych, "a@x.com")
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_surfaces_database_error() {
        let pool = setup_test_db().await;

        // Both sides of a same-email race reach INSERT; the second hits the
        // unique constraint and must come back as a Database error
        let input = sample_input("race@x.com");
        let mut conn = pool.acquire().await.unwrap();

        insert_record_row(&mut conn, RecordKind::Prognostic, "id-1", &input)
            .await
            .unwrap();
        let err = insert_record_row(&mut conn, RecordKind::Prognostic, "id-2", &input)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Database(_)));

        // Release the pool's only connection before querying via the pool
        // again (max_connections(1)); it is reused so the same in-memory DB
        // is observed.
        drop(conn);

        // Exactly one row made it in
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prognostic")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    fn sample_profile(email: &str) -> AudioProfileInput {
        AudioProfileInput {
            user_email: email.to_string(),
            audio_link: "https://cdn.example.com/a.mp3".to_string(),
            audio_link_two: Some("https://cdn.example.com/b.mp3".to_string()),
            headline: "Welcome".to_string(),
            industry: "Coaching".to_string(),
            salesletter: "long copy".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_profile_upsert_roundtrip() {
        let pool = setup_test_db().await;

        let outcome = upsert_profile(&pool, &sample_profile("p@x.com")).await.unwrap();
        assert!(outcome.is_created());

        let profile = fetch_profile(&pool, "p@x.com").await.unwrap().unwrap();
        assert_eq!(profile.audio_link.as_deref(), Some("https://cdn.example.com/a.mp3"));
        assert_eq!(profile.industry.as_deref(), Some("Coaching"));
        assert_eq!(profile.salesletter.as_deref(), Some("long copy"));
        // Unset content fields were written as empty strings, not NULL
        assert_eq!(profile.exit_message.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_profile_update_overwrites_every_field() {
        let pool = setup_test_db().await;

        upsert_profile(&pool, &sample_profile("p@x.com")).await.unwrap();

        let mut second = AudioProfileInput {
            user_email: "p@x.com".to_string(),
            audio_link: "https://cdn.example.com/new.mp3".to_string(),
            ..Default::default()
        };
        second.company_name = "Acme".to_string();
        let outcome = upsert_profile(&pool, &second).await.unwrap();
        assert!(!outcome.is_created());

        let profile = fetch_profile(&pool, "p@x.com").await.unwrap().unwrap();
        assert_eq!(profile.audio_link.as_deref(), Some("https://cdn.example.com/new.mp3"));
        assert_eq!(profile.company_name.as_deref(), Some("Acme"));
        // Previously set fields absent from the second request were cleared
        assert_eq!(profile.headline.as_deref(), Some(""));
        assert_eq!(profile.audio_link_two, None);
    }

    #[tokio::test]
    async fn test_fetch_profile_missing_returns_none() {
        let pool = setup_test_db().await;

        let profile = fetch_profile(&pool, "nobody@x.com").await.unwrap();
        assert!(profile.is_none());
    }
}
