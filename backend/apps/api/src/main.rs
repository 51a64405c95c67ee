//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod settings;

use axum::{
    Router,
    http::{HeaderName, Method, header},
};
use platform::client::API_KEY_NAME;
use platform::rate_limit::RateLimitTracker;
use settings::Settings;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transient::{ApiConfig, PgTransientRepository, TnsClient, TnsConfig, transient_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,transient=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect(&settings.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Upstream registry: one rate limit tracker for the whole process
    let tns_config = TnsConfig::from_env()?;
    tracing::info!(
        api_url = %tns_config.api_url,
        bot_id = tns_config.bot.id,
        bot_name = %tns_config.bot.name,
        "TNS bot configured"
    );
    let tracker = Arc::new(RateLimitTracker::new());
    let tns_client = TnsClient::new(Arc::new(tns_config), tracker);

    let repo = PgTransientRepository::new(pool);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(API_KEY_NAME),
        ]));

    // Build router
    let app = Router::new()
        .merge(transient_router(
            repo,
            tns_client,
            ApiConfig::new(settings.api_key.clone()),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = settings.addr();
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
