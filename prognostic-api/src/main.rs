//! prognostic-api - JSON/HTTP backend for personalized result pages
//!
//! Accepts markup text keyed by email, renders it to HTML, and upserts it
//! into one of several record tables; also stores the audio/profile
//! metadata used by the result pages. Startup reconciles the database
//! schema before the listener binds.

use anyhow::Result;
use clap::Parser;
use prognostic_api::{build_router, AppState};
use prognostic_common::config;
use std::net::SocketAddr;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "prognostic-api", version, about = "Prognostic record upsert service")]
struct Args {
    /// Database connection string (e.g. sqlite://prognostic.db?mode=rwc)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port
    #[arg(long, env = "PORT", default_value_t = 5001)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting prognostic-api v{}", env!("CARGO_PKG_VERSION"));

    let db_url = config::resolve_database_url(args.database_url.as_deref());
    info!("Database: {}", db_url);

    // Schema failures here are fatal; the service cannot run without its
    // tables and columns
    let pool = prognostic_common::db::init_database(&db_url).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("prognostic-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
