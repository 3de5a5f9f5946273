//! Record insert/fetch/delete handlers
//!
//! All four record resources run through one generic core; the per-route
//! functions only pin the `RecordKind`. Wire format:
//!
//! - insert created: 201 `{"message": "... added successfully!", "user_id"}`
//! - insert updated: 200 `{"message": "... updated successfully!", "user_id"}`
//! - fetch found: 200 `{"success": true, "text", "user_email",
//!   "booking_button_name", "booking_button_redirection", "length"}`
//! - fetch/delete miss: 404 `{"success": false, "message": "User not found"}`
//! - validation / store failure: 400 `{"error": ...}`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::audit::{self, TEXT_PLACEHOLDER};
use crate::api::error::ApiError;
use crate::AppState;
use prognostic_common::db::records::{
    delete_record, fetch_record, upsert_record, RecordInput, RecordKind, UpsertOutcome,
};
use prognostic_common::markup;

#[derive(Debug, Deserialize)]
pub struct InsertRecordRequest {
    pub user_email: Option<String>,
    /// Alternate identity some callers send when the primary is absent
    pub lead_email: Option<String>,
    pub text: Option<String>,
    pub booking_button_name: Option<String>,
    pub booking_button_redirection: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FetchRecordRequest {
    pub user_email: Option<String>,
    pub lead_email: Option<String>,
}

/// Resolve the identity field, falling back to `lead_email`. Empty strings
/// count as absent.
fn identity<'a>(user_email: &'a Option<String>, lead_email: &'a Option<String>) -> Option<&'a str> {
    user_email
        .as_deref()
        .filter(|e| !e.is_empty())
        .or_else(|| lead_email.as_deref().filter(|e| !e.is_empty()))
}

// ============================================================================
// Insert (upsert)
// ============================================================================

async fn upsert(state: AppState, kind: RecordKind, req: InsertRecordRequest) -> Response {
    let payload = json!({
        "user_email": identity(&req.user_email, &req.lead_email),
        "booking_button_name": &req.booking_button_name,
        "booking_button_redirection": &req.booking_button_redirection,
        "text": TEXT_PLACEHOLDER,
    });

    let response = match try_upsert(&state, kind, &req).await {
        Ok(outcome) => {
            let (status, verb) = if outcome.is_created() {
                (StatusCode::CREATED, "added")
            } else {
                (StatusCode::OK, "updated")
            };
            let body = json!({
                "message": format!("{} {} successfully!", kind.label(), verb),
                "user_id": outcome.user_id(),
            });
            (status, Json(body)).into_response()
        }
        Err(e) => e.into_response(),
    };

    audit::with_payload(response, payload)
}

async fn try_upsert(
    state: &AppState,
    kind: RecordKind,
    req: &InsertRecordRequest,
) -> Result<UpsertOutcome, ApiError> {
    let user_email = identity(&req.user_email, &req.lead_email)
        .ok_or_else(|| ApiError::Validation("user_email is required".to_string()))?
        .to_string();

    // The text field arrives percent-encoded from some callers; decode
    // before rendering so markup markers survive
    let raw = req.text.clone().unwrap_or_default();
    let decoded = match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.clone(),
    };

    let input = RecordInput {
        user_email,
        text: markup::render(&decoded),
        booking_button_name: req.booking_button_name.clone(),
        booking_button_redirection: req.booking_button_redirection.clone(),
    };

    upsert_record(&state.db, kind, &input)
        .await
        .map_err(ApiError::from)
}

pub async fn insert_user(
    State(state): State<AppState>,
    Json(req): Json<InsertRecordRequest>,
) -> Response {
    upsert(state, RecordKind::Prognostic, req).await
}

pub async fn insert_user_psych(
    State(state): State<AppState>,
    Json(req): Json<InsertRecordRequest>,
) -> Response {
    upsert(state, RecordKind::PrognosticPsych, req).await
}

pub async fn insert_user_one(
    State(state): State<AppState>,
    Json(req): Json<InsertRecordRequest>,
) -> Response {
    upsert(state, RecordKind::ResultsOne, req).await
}

pub async fn insert_user_two(
    State(state): State<AppState>,
    Json(req): Json<InsertRecordRequest>,
) -> Response {
    upsert(state, RecordKind::ResultsTwo, req).await
}

// ============================================================================
// Fetch
// ============================================================================

async fn fetch(state: AppState, kind: RecordKind, req: FetchRecordRequest) -> Response {
    let payload = json!({
        "user_email": identity(&req.user_email, &req.lead_email),
    });

    let response = match try_fetch(&state, kind, &req).await {
        Ok(record) => {
            let body = json!({
                "success": true,
                "text": record.text,
                "user_email": record.user_email,
                "booking_button_name": record.booking_button_name,
                "booking_button_redirection": record.booking_button_redirection,
                "length": record.text.chars().count(),
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => e.into_response(),
    };

    audit::with_payload(response, payload)
}

async fn try_fetch(
    state: &AppState,
    kind: RecordKind,
    req: &FetchRecordRequest,
) -> Result<prognostic_common::db::models::Record, ApiError> {
    let user_email = identity(&req.user_email, &req.lead_email)
        .ok_or_else(|| ApiError::Validation("Email parameter is required".to_string()))?;

    fetch_record(&state.db, kind, user_email)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Json(req): Json<FetchRecordRequest>,
) -> Response {
    fetch(state, RecordKind::Prognostic, req).await
}

pub async fn get_user_psych(
    State(state): State<AppState>,
    Json(req): Json<FetchRecordRequest>,
) -> Response {
    fetch(state, RecordKind::PrognosticPsych, req).await
}

pub async fn get_user_one(
    State(state): State<AppState>,
    Json(req): Json<FetchRecordRequest>,
) -> Response {
    fetch(state, RecordKind::ResultsOne, req).await
}

pub async fn get_user_two(
    State(state): State<AppState>,
    Json(req): Json<FetchRecordRequest>,
) -> Response {
    fetch(state, RecordKind::ResultsTwo, req).await
}

// ============================================================================
// Delete (prognostic and prognostic_psych only)
// ============================================================================

async fn remove(state: AppState, kind: RecordKind, user_email: String) -> Response {
    let payload = json!({ "user_email": &user_email });

    let response = match delete_record(&state.db, kind, &user_email).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("{} deleted successfully", kind.label()),
            })),
        )
            .into_response(),
        Ok(false) => ApiError::NotFound("User not found".to_string()).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    };

    audit::with_payload(response, payload)
}

pub async fn delete_user(State(state): State<AppState>, Path(email): Path<String>) -> Response {
    remove(state, RecordKind::Prognostic, email).await
}

pub async fn delete_user_psych(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Response {
    remove(state, RecordKind::PrognosticPsych, email).await
}
