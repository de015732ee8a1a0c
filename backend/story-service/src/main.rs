use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use story_service::config::StorageBackend;
use story_service::db::{MemoryStoryStore, PgStoryStore, StoryStore};
use story_service::handlers;
use story_service::jobs::StoryReaper;
use story_service::middleware::JwtValidator;
use story_service::services::{ImageStore, StoriesService};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
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

async fn build_store(config: &story_service::Config) -> anyhow::Result<Arc<dyn StoryStore>> {
    match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory story store; stories are lost on restart");
            Ok(Arc::new(MemoryStoryStore::new()))
        }
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(&config.database.url)
                .await
                .context("Failed to create database pool")?;

            if config.database.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");
            }

            tracing::info!(
                max_connections = config.database.max_connections,
                "Connected to PostgreSQL"
            );
            Ok(Arc::new(PgStoryStore::new(pool)))
        }
    }
}

/// Story Service
///
/// Serves ephemeral 24-hour stories over HTTP.
///
/// # Routes
///
/// - `/api/stories/*` - List, create, view and delete stories
/// - `/uploads/*` - Story images
/// - `/api/v1/health*`, `/metrics` - Operations
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match story_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting story-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let store = build_store(&config).await?;
    let service = StoriesService::new(store);

    let images = ImageStore::new(config.uploads.dir.clone(), config.uploads.max_bytes);
    images
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create upload dir {}", images.dir().display()))?;

    let service_data = web::Data::new(service.clone());
    let images_data = web::Data::new(images);
    let jwt_data = web::Data::new(JwtValidator::new(&config.auth.jwt_secret));

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(service_data.clone())
            .app_data(images_data.clone())
            .app_data(jwt_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&http_bind_address)
    .with_context(|| format!("Failed to bind {}", http_bind_address))?
    .workers(config.app.workers)
    .run();

    let server_handle = server.handle();
    let (shutdown_tx, _) = broadcast::channel(1);

    let mut tasks: JoinSet<std::io::Result<()>> = JoinSet::new();

    tasks.spawn(async move {
        tracing::info!("HTTP server is running");
        server.await
    });

    if config.reaper.enabled {
        let reaper = StoryReaper::new(
            service.clone(),
            Duration::from_secs(config.reaper.interval_secs),
        );
        let reaper_shutdown = shutdown_tx.subscribe();
        tasks.spawn(async move {
            reaper.run(reaper_shutdown).await;
            Ok(())
        });
    }

    let mut first_error: Option<anyhow::Error> = None;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = tasks.join_next() => {
                match result {
                    Some(Ok(Ok(_))) => {
                        tracing::info!("Background task completed");
                    }
                    Some(Ok(Err(e))) => {
                        tracing::error!("Task returned error: {}", e);
                        first_error.get_or_insert(e.into());
                        let _ = shutdown_tx.send(());
                        server_handle.stop(true).await;
                        tasks.shutdown().await;
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::error!("Task join error: {}", e);
                        first_error.get_or_insert(e.into());
                        let _ = shutdown_tx.send(());
                        server_handle.stop(true).await;
                        tasks.shutdown().await;
                        break;
                    }
                    None => break,
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                let _ = shutdown_tx.send(());
                server_handle.stop(true).await;
                tasks.shutdown().await;
                break;
            }
        }
    }

    tracing::info!("Story-service shutting down");

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
