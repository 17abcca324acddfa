use std::sync::Arc;

use actix_cors::Cors;
use actix_middleware::{Logging, MetricsMiddleware};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use blog_service::config::{Config, StorageBackend};
use blog_service::db::{BlogStore, MemoryStore, PgStore};
use blog_service::{routes, AppState};
use db_pool::{create_pool, DbConfig};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Open the configured store, running migrations for PostgreSQL
async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn BlogStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let db_cfg = DbConfig::from_env("blog-service")
                .map_err(anyhow::Error::msg)
                .context("Invalid database configuration")?;
            db_cfg.log_config();

            let pool = create_pool(db_cfg)
                .await
                .context("Failed to create database pool")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

/// Blog Service
///
/// REST API for posts, groups, comments and follows.
///
/// # Routes
///
/// - `/v1/posts/*` - posts and their nested comments
/// - `/v1/groups/*` - read-only groups
/// - `/v1/follow/` - follow edges of the caller
/// - `/v1/jwt/*` - token obtain, refresh and verify
/// - `/v1/users/` - registration
/// - `/health`, `/health/ready`, `/health/live`, `/metrics`
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            anyhow::bail!("Failed to load configuration: {e}");
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    crypto_core::jwt::initialize_jwt_keys(&config.jwt.private_key_pem, &config.jwt.public_key_pem)
        .context("Failed to initialize JWT keys")?;

    let store = open_store(&config).await?;
    tracing::info!(storage = store.backend(), "Storage ready");

    let state = web::Data::new(AppState::new(store, config.pagination));
    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let cors_config = config.cors.clone();

    tracing::info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in cors_config.origins() {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(MetricsMiddleware)
            .wrap(Logging)
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(routes::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {bind_address}"))?
    .disable_signals()
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining connections");
        handle.stop(true).await;
    });

    server.await.context("HTTP server error")?;
    tracing::info!("blog-service stopped");
    Ok(())
}
