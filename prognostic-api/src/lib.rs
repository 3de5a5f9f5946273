//! prognostic-api library - JSON/HTTP record upsert service
//!
//! Router assembly lives here so integration tests can drive the service
//! in-process without binding a socket.

use axum::Router;
use sqlx::SqlitePool;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};
    use tower_http::cors::CorsLayer;

    Router::new()
        // Record resources: one insert/fetch pair per table
        .route("/insert_user", post(api::insert_user))
        .route("/get_user", post(api::get_user))
        .route("/insert_user_psych", post(api::insert_user_psych))
        .route("/get_user_psych", post(api::get_user_psych))
        .route("/insert_user_one", post(api::insert_user_one))
        .route("/get_user_one", post(api::get_user_one))
        .route("/insert_user_two", post(api::insert_user_two))
        .route("/get_user_two", post(api::get_user_two))
        // Deletion exists for two of the record resources only
        .route("/user/email/:email", delete(api::delete_user))
        .route("/user/email/:email/psych", delete(api::delete_user_psych))
        // Audio/profile resource
        .route("/insert_audio", post(api::insert_audio))
        .route("/get_audio", get(api::get_audio))
        .merge(api::health_routes())
        // One structured audit record per request
        .layer(middleware::from_fn(api::audit))
        // Local/browser access
        .layer(CorsLayer::permissive())
        .with_state(state)
}
