use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;

use bookkey::config::Config;
use bookkey::db::{create_pool, init_db, verify_schema, AppState};
use bookkey::email::Mailer;
use bookkey::handlers;
use bookkey::maintenance::MaintenanceGate;
use bookkey::registry;

#[derive(Parser, Debug)]
#[command(name = "bookkey")]
#[command(about = "License issuance and redemption server for ebook access")]
struct Cli {
    /// Mint this many license keys, print them, and exit (no server)
    #[arg(long)]
    mint: Option<u32>,

    /// Activation quota for minted keys
    #[arg(long, default_value_t = 1)]
    max_activations: u32,

    /// Validity in days for minted keys (defaults to the server default)
    #[arg(long)]
    validity_days: Option<i64>,
}

/// Batch-mint keys from the command line, for sellers who pre-generate
/// licenses instead of calling /generate-license.
fn mint_keys(state: &AppState, count: u32, max_activations: u32, validity_days: i64) {
    let conn = state.db.get().expect("Failed to get db connection for minting");
    for _ in 0..count {
        let license = registry::issue(&conn, max_activations, validity_days)
            .expect("Failed to mint license");
        println!("{}", license.license_key);
    }
    tracing::info!(count, max_activations, validity_days, "Minted license keys");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookkey=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    // Fail fast when the store is unusable: open, create tables, and check
    // the column contract before accepting any request.
    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
        verify_schema(&conn).expect("Database schema does not match the expected columns");
    }

    let maintenance = {
        let conn = db_pool.get().expect("Failed to get connection");
        MaintenanceGate::load(&conn).expect("Failed to load maintenance flag")
    };

    if config.resend_api_key.is_none() {
        tracing::warn!("RESEND_API_KEY not set; welcome emails are disabled");
    }

    let state = AppState {
        db: db_pool,
        maintenance,
        mailer: Arc::new(Mailer::new(
            config.resend_api_key.clone(),
            config.email_from.clone(),
        )),
        default_validity_days: config.default_validity_days,
    };

    if let Some(count) = cli.mint {
        let validity_days = cli.validity_days.unwrap_or(config.default_validity_days);
        mint_keys(&state, count, cli.max_activations, validity_days);
        return;
    }

    let cors = {
        let layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE]);
        match &config.allowed_origin {
            Some(origin) => layer.allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .expect("ALLOWED_ORIGIN is not a valid origin"),
            ),
            None => layer,
        }
    };

    let app = handlers::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Bookkey server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
