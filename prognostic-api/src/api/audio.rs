//! Audio/profile handlers
//!
//! The profile resource differs from the record resources in two
//! contract points callers rely on:
//! - `insert_audio` requires `audio_link` alongside the email
//! - `get_audio` answers 200 whether or not a row exists; a miss yields
//!   the all-empty projection

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::audit;
use crate::api::error::ApiError;
use crate::AppState;
use prognostic_common::db::models::AudioProfile;
use prognostic_common::db::records::{fetch_profile, upsert_profile, AudioProfileInput};

/// Insert/update payload. Every content field absent from the request is
/// written as an empty string; nothing is preserved across upserts.
#[derive(Debug, Deserialize)]
pub struct InsertAudioRequest {
    pub user_email: Option<String>,
    pub audio_link: Option<String>,
    pub audio_link_two: Option<String>,
    #[serde(default)]
    pub exit_message: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default, rename = "Industry")]
    pub industry: String,
    #[serde(default, rename = "Products_services")]
    pub products_services: String,
    #[serde(default, rename = "Business_description")]
    pub business_description: String,
    #[serde(default)]
    pub primary_goal: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub pain_points: String,
    #[serde(default)]
    pub offer_name: String,
    #[serde(default)]
    pub offer_price: String,
    #[serde(default)]
    pub offer_description: String,
    #[serde(default)]
    pub primary_benefits: String,
    #[serde(default)]
    pub offer_goal: String,
    #[serde(default, rename = "Offer_topic")]
    pub offer_topic: String,
    #[serde(default)]
    pub target_url: String,
    #[serde(default)]
    pub testimonials: String,
    #[serde(default)]
    pub email_1: String,
    #[serde(default)]
    pub email_2: String,
    #[serde(default)]
    pub salesletter: String,
}

#[derive(Debug, Deserialize)]
pub struct GetAudioQuery {
    pub user_email: Option<String>,
}

/// POST /insert_audio
pub async fn insert_audio(
    State(state): State<AppState>,
    Json(req): Json<InsertAudioRequest>,
) -> Response {
    let payload = json!({
        "user_email": &req.user_email,
        "audio_link": &req.audio_link,
        "audio_link_two": &req.audio_link_two,
    });

    let user_email = req.user_email.as_deref().filter(|e| !e.is_empty());
    let audio_link = req.audio_link.as_deref().filter(|l| !l.is_empty());

    let (user_email, audio_link) = match (user_email, audio_link) {
        (Some(email), Some(link)) => (email.to_string(), link.to_string()),
        _ => {
            let response =
                ApiError::Validation("Missing user_email or audio_link".to_string())
                    .into_response();
            return audit::with_payload(response, payload);
        }
    };

    let input = AudioProfileInput {
        user_email,
        audio_link,
        audio_link_two: req.audio_link_two.clone(),
        exit_message: req.exit_message,
        headline: req.headline,
        company_name: req.company_name,
        industry: req.industry,
        products_services: req.products_services,
        business_description: req.business_description,
        primary_goal: req.primary_goal,
        target_audience: req.target_audience,
        pain_points: req.pain_points,
        offer_name: req.offer_name,
        offer_price: req.offer_price,
        offer_description: req.offer_description,
        primary_benefits: req.primary_benefits,
        offer_goal: req.offer_goal,
        offer_topic: req.offer_topic,
        target_url: req.target_url,
        testimonials: req.testimonials,
        email_1: req.email_1,
        email_2: req.email_2,
        salesletter: req.salesletter,
    };

    let response = match upsert_profile(&state.db, &input).await {
        Ok(outcome) if outcome.is_created() => (
            StatusCode::CREATED,
            Json(json!({ "message": "Audio inserted successfully" })),
        )
            .into_response(),
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Audio updated successfully" })),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    };

    audit::with_payload(response, payload)
}

/// GET /get_audio?user_email=...
pub async fn get_audio(State(state): State<AppState>, Query(query): Query<GetAudioQuery>) -> Response {
    let payload = json!({ "user_email": &query.user_email });

    let user_email = match query.user_email.as_deref().filter(|e| !e.is_empty()) {
        Some(email) => email.to_string(),
        None => {
            let response =
                ApiError::Validation("No user_email provided".to_string()).into_response();
            return audit::with_payload(response, payload);
        }
    };

    let response = match fetch_profile(&state.db, &user_email).await {
        Ok(Some(profile)) => (StatusCode::OK, Json(projection(profile))).into_response(),
        Ok(None) => (StatusCode::OK, Json(empty_projection())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    };

    audit::with_payload(response, payload)
}

/// Full profile projection; NULL content fields are coerced to ""
fn projection(profile: AudioProfile) -> Value {
    json!({
        "audio_link": profile.audio_link,
        "audio_link_two": profile.audio_link_two,
        "exit_message": profile.exit_message.unwrap_or_default(),
        "headline": profile.headline.unwrap_or_default(),
        "company_name": profile.company_name.unwrap_or_default(),
        "Industry": profile.industry.unwrap_or_default(),
        "Products_services": profile.products_services.unwrap_or_default(),
        "Business_description": profile.business_description.unwrap_or_default(),
        "primary_goal": profile.primary_goal.unwrap_or_default(),
        "target_audience": profile.target_audience.unwrap_or_default(),
        "pain_points": profile.pain_points.unwrap_or_default(),
        "offer_name": profile.offer_name.unwrap_or_default(),
        "offer_price": profile.offer_price.unwrap_or_default(),
        "offer_description": profile.offer_description.unwrap_or_default(),
        "primary_benefits": profile.primary_benefits.unwrap_or_default(),
        "offer_goal": profile.offer_goal.unwrap_or_default(),
        "Offer_topic": profile.offer_topic.unwrap_or_default(),
        "target_url": profile.target_url.unwrap_or_default(),
        "testimonials": profile.testimonials.unwrap_or_default(),
        "email_1": profile.email_1.unwrap_or_default(),
        "email_2": profile.email_2.unwrap_or_default(),
        "salesletter": profile.salesletter.unwrap_or_default(),
    })
}

/// Projection returned when no profile exists for the email
fn empty_projection() -> Value {
    json!({
        "audio_link": null,
        "audio_link_two": null,
        "exit_message": "",
        "headline": "",
        "company_name": "",
        "Industry": "",
        "Products_services": "",
        "Business_description": "",
        "primary_goal": "",
        "target_audience": "",
        "pain_points": "",
        "offer_name": "",
        "offer_price": "",
        "offer_description": "",
        "primary_benefits": "",
        "offer_goal": "",
        "Offer_topic": "",
        "target_url": "",
        "testimonials": "",
        "email_1": "",
        "email_2": "",
        "salesletter": "",
    })
}
