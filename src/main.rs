use std::{str::FromStr, sync::Arc};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use noticeboard::{
    api,
    auth::FirebaseTokenVerifier,
    config::Settings,
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "noticeboard=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting notice board server on {}", settings.bind_address());

    // Initialize database
    let connect_options = SqliteConnectOptions::from_str(&settings.database.url)?
        .create_if_missing(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect_with(connect_options)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let verifier = Arc::new(FirebaseTokenVerifier::new(&settings.auth)?);
    let service_context = Arc::new(ServiceContext::with_sqlite(db_pool.clone(), verifier));

    let bind_address = settings.bind_address();
    let app = api::create_app(service_context, Arc::new(settings));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    tracing::info!("Server listening on http://{}", bind_address);
    tracing::info!("API documentation at http://{}/docs", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
