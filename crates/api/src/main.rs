use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use versawiki_cache::{CacheClient, CoherentCache, MemoryCache};
use versawiki_core::integrity::IntegrityCodec;
use versawiki_db::memory::{MemoryPageStore, MemoryUserStore};
use versawiki_db::store::{PageStore, PgPageStore, PgUserStore, UserStore};
use versawiki_wiki::WikiContext;

use versawiki_api::config::ServerConfig;
use versawiki_api::router::build_app_router;
use versawiki_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "versawiki_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Stores ---
    let (users, pages) = open_stores(&config).await?;

    // --- Cache ---
    // One in-process cache per server; every write still goes through CAS,
    // so a networked client can be swapped in behind `CacheClient`.
    let cache_client: Arc<dyn CacheClient> = Arc::new(MemoryCache::new());
    let cache = CoherentCache::new(cache_client).with_max_cas_attempts(config.cache_max_cas_attempts);

    // --- App state ---
    let wiki = WikiContext::new(
        users,
        pages,
        cache,
        IntegrityCodec::new(config.session_secret.as_str()),
    );
    let state = AppState {
        wiki,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let host = config
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// PostgreSQL stores when `DATABASE_URL` is set, in-memory ones otherwise.
async fn open_stores(
    config: &ServerConfig,
) -> anyhow::Result<(Arc<dyn UserStore>, Arc<dyn PageStore>)> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using in-memory stores");
        let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
        let pages: Arc<dyn PageStore> = Arc::new(MemoryPageStore::new());
        return Ok((users, pages));
    };

    let pool = versawiki_db::create_pool(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    versawiki_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    versawiki_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let pages: Arc<dyn PageStore> = Arc::new(PgPageStore::new(pool));
    Ok((users, pages))
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
