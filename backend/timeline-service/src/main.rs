use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use timeline_service::cache::RedisGlobalFeedCache;
use timeline_service::handlers::{self, AppState, HealthState};
use timeline_service::middleware::{TimingMiddleware, ViewerIdentityMiddleware};
use timeline_service::repository::{
    PgAuthorRepository, PgCommentRepository, PgFollowRepository, PgGroupRepository,
    PgPostRepository,
};
use timeline_service::Config;

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting timeline-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    // Verify database connection
    sqlx::query("SELECT 1")
        .execute(&pg_pool)
        .await
        .context("Failed to verify database connection")?;
    info!("Database pool created and verified");

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let redis_client =
        redis::Client::open(config.cache.url.as_str()).context("Failed to create Redis client")?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis connection established");

    let cache = Arc::new(RedisGlobalFeedCache::new(
        redis_conn.clone(),
        config.cache.key_prefix.clone(),
        config.cache.global_feed_ttl_secs,
    ));

    let app_state = web::Data::new(AppState::new(
        Arc::new(PgAuthorRepository::new(pg_pool.clone())),
        Arc::new(PgGroupRepository::new(pg_pool.clone())),
        Arc::new(PgPostRepository::new(pg_pool.clone())),
        Arc::new(PgCommentRepository::new(pg_pool.clone())),
        Arc::new(PgFollowRepository::new(pg_pool.clone())),
        cache,
        config.feed.page_size,
    ));
    let health_state = web::Data::new(HealthState::new(pg_pool, redis_conn));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.app.cors_allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        if allowed_origins.is_empty() {
            cors = cors.allow_any_origin();
        } else {
            for origin in &allowed_origins {
                if origin == "*" {
                    cors = cors.allow_any_origin();
                } else {
                    cors = cors.allowed_origin(origin);
                }
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(TimingMiddleware)
            .route("/health", web::get().to(handlers::health_summary))
            .route("/health/ready", web::get().to(handlers::readiness_summary))
            .route("/health/live", web::get().to(handlers::liveness_check))
            .service(
                web::scope("/api/v1")
                    .wrap(ViewerIdentityMiddleware)
                    .configure(handlers::configure),
            )
    })
    .bind(&bind_address)
    .context("Failed to bind HTTP server")?
    .run();

    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        server_handle.stop(true).await;
    });

    server.await.context("HTTP server error")?;

    info!("timeline-service shutting down");
    Ok(())
}
