use std::{sync::Arc, time::Duration};
use sqlx::sqlite::SqlitePoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turfbook::{
    api,
    config::Settings,
    email,
    service::{clock::SystemClock, ServiceContext},
};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turfbook=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting Turfbook server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let mailer = email::sender_from_config(settings.email.as_ref())?;
    tracing::info!("Outgoing email via {}", mailer.name());

    let clock = Arc::new(SystemClock::new(settings.booking.utc_offset_minutes));

    let service_context = Arc::new(ServiceContext::new(
        db_pool.clone(),
        &settings,
        mailer,
        clock,
    ));

    let shutdown = CancellationToken::new();

    // Expired sessions are only ever rejected on lookup; sweep them periodically
    let cleanup = {
        let auth_service = service_context.auth_service.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => match auth_service.cleanup_expired_sessions().await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!("Removed {} expired sessions", n),
                        Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                    },
                }
            }
        })
    };

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    cleanup.await?;

    Ok(())
}
