//! Database models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of a record table (prognostic, prognostic_psych, results_one,
/// results_two all share this shape)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Record {
    pub user_id: String,
    pub user_email: String,
    pub text: String,
    pub created_at: NaiveDateTime,
    pub booking_button_name: Option<String>,
    pub booking_button_redirection: Option<String>,
}

/// One row of the user_audio profile table.
///
/// The renamed fields carry the table's historical column capitalization,
/// which is also the JSON wire spelling.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AudioProfile {
    pub id: String,
    pub user_email: String,
    pub audio_link: Option<String>,
    pub audio_link_two: Option<String>,
    pub exit_message: Option<String>,
    pub headline: Option<String>,
    pub company_name: Option<String>,
    #[sqlx(rename = "Industry")]
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
    #[sqlx(rename = "Products_services")]
    #[serde(rename = "Products_services")]
    pub products_services: Option<String>,
    #[sqlx(rename = "Business_description")]
    #[serde(rename = "Business_description")]
    pub business_description: Option<String>,
    pub primary_goal: Option<String>,
    pub target_audience: Option<String>,
    pub pain_points: Option<String>,
    pub offer_name: Option<String>,
    pub offer_price: Option<String>,
    pub offer_description: Option<String>,
    pub primary_benefits: Option<String>,
    pub offer_goal: Option<String>,
    #[sqlx(rename = "Offer_topic")]
    #[serde(rename = "Offer_topic")]
    pub offer_topic: Option<String>,
    pub target_url: Option<String>,
    pub testimonials: Option<String>,
    pub email_1: Option<String>,
    pub email_2: Option<String>,
    pub salesletter: Option<String>,
}
