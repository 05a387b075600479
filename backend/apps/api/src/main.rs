//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use auth::{AuthConfig, PgAuthRepository, auth_router, user_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: sweep expired refresh records
    // Errors here should not prevent server startup
    let repo = PgAuthRepository::new(pool.clone());
    match repo.cleanup_expired().await {
        Ok(deleted) => {
            tracing::info!(records_deleted = deleted, "Refresh token cleanup completed");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Refresh token cleanup failed, continuing anyway"
            );
        }
    }

    // Auth configuration
    // The signing secret is a fatal precondition: without it, no token
    // this process issued could ever be trusted
    let token_secret =
        env::var("JWT_SECRET").expect("JWT_SECRET must be set in environment");
    assert!(!token_secret.is_empty(), "JWT_SECRET must not be empty");

    let auth_config = AuthConfig {
        token_secret: token_secret.into_bytes(),
        access_token_ttl: env_duration("JWT_EXPIRES_IN", 7 * 24 * 3600),
        refresh_token_ttl: env_duration("JWT_REFRESH_EXPIRES_IN", 30 * 24 * 3600),
        cookie_secure: env::var("APP_ENV").is_ok_and(|v| v == "production"),
        ..AuthConfig::default()
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://localhost:5174".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/auth", auth_router(repo.clone(), auth_config.clone()))
        .nest("/api/users", user_router(repo, auth_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3333);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Read a duration in seconds from the environment, with a default
fn env_duration(name: &str, default_secs: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}
