use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use blog_service::config::{CacheBackend, StoreBackend};
use blog_service::db::{BlogStore, MemoryStore, PgStore};
use blog_service::middleware::{AuthSettings, MetricsMiddleware, SessionAuthMiddleware};
use blog_service::security::TokenVerifier;
use blog_service::{routes, AppState, Config};
use page_cache::{PageCache, RedisStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

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

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn BlogStore>> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let url = config
                .store
                .database_url
                .as_deref()
                .context("DATABASE_URL environment variable not set")?;
            let pool = PgPoolOptions::new()
                .max_connections(config.store.max_connections)
                .min_connections(config.store.min_connections)
                .acquire_timeout(Duration::from_secs(10))
                .connect(url)
                .await
                .context("Failed to connect to PostgreSQL")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data does not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn build_page_cache(config: &Config) -> anyhow::Result<PageCache> {
    let ttl = Duration::from_secs(config.cache.ttl_secs);

    match config.cache.backend {
        CacheBackend::Memory => Ok(PageCache::in_memory(ttl, config.cache.max_entries)),
        CacheBackend::Redis => {
            let url = config
                .cache
                .redis_url
                .as_deref()
                .context("REDIS_URL environment variable not set")?;
            let store = RedisStore::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            Ok(PageCache::new(Arc::new(store), ttl))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let store = build_store(&config).await?;
    let page_cache = build_page_cache(&config).await?;
    tracing::info!(
        store = ?config.store.backend,
        page_cache = ?config.cache.backend,
        ttl_secs = config.cache.ttl_secs,
        posts_per_page = config.feed.posts_per_page,
        "Backends initialized"
    );

    let state = web::Data::new(AppState::new(
        store,
        Arc::new(page_cache),
        config.feed.posts_per_page,
    ));
    let auth_settings = web::Data::new(AuthSettings {
        login_url: config.auth.login_url.clone(),
    });
    let verifier = Arc::new(TokenVerifier::new(&config.auth.jwt_secret));
    let cookie_name = config.auth.session_cookie_name.clone();
    let admin_endpoints_enabled = config.app.admin_endpoints_enabled;

    let bind_address = format!("{}:{}", config.app.host, config.app.http_port);
    tracing::info!("Starting HTTP server on {}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(auth_settings.clone())
            .wrap(MetricsMiddleware)
            .wrap(SessionAuthMiddleware::new(
                verifier.clone(),
                state.store.clone(),
                &cookie_name,
            ))
            .wrap(Logger::default())
            .wrap(TracingLogger::default())
            .configure(routes::configure)
            .configure(|cfg| {
                if admin_endpoints_enabled {
                    routes::configure_admin(cfg);
                }
            })
    })
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    let handle = server.handle();
    tokio::select! {
        result = server => {
            result.context("HTTP server error")?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping HTTP server");
            handle.stop(true).await;
        }
    }

    tracing::info!("blog-service stopped");
    Ok(())
}
