//! Lorecraftr Back binary entrypoint wiring REST, WebSocket, SSE and storage layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use axum::Router;
use lorecraftr_back::{
    config::AppConfig,
    dao::{
        storage::StorageError,
        story_store::{StoryStore, memory::MemoryStoryStore},
    },
    routes,
    services::{content_service, storage_supervisor},
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Storage backend selected through `STORAGE_BACKEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageBackend {
    Mongo,
    Couch,
    Memory,
}

impl StorageBackend {
    fn from_env() -> anyhow::Result<Self> {
        let value = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "mongo".into());
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "couch" | "couchdb" => Ok(Self::Couch),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown STORAGE_BACKEND `{other}` (expected mongo, couch or memory)"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);
    let backend = StorageBackend::from_env()?;
    info!(?backend, "selected storage backend");

    start_storage(app_state.clone(), backend).await?;
    tokio::spawn(storage_supervisor::forward_status(app_state.clone()));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the in-memory store right away, or supervise a remote backend in the background.
async fn start_storage(state: SharedState, backend: StorageBackend) -> anyhow::Result<()> {
    match backend {
        StorageBackend::Memory => {
            let store: Arc<dyn StoryStore> = Arc::new(MemoryStoryStore::new());
            content_service::seed_catalog(store.clone(), state.config().catalog())
                .await
                .context("seeding in-memory content")?;
            state.set_story_store(store).await;
        }
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            use lorecraftr_back::dao::story_store::mongodb::{MongoConfig, MongoStoryStore};

            tokio::spawn(storage_supervisor::run(state, || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoStoryStore::connect(config).await?;
                Ok::<Arc<dyn StoryStore>, StorageError>(Arc::new(store))
            }));
        }
        #[cfg(feature = "couch-store")]
        StorageBackend::Couch => {
            use lorecraftr_back::dao::story_store::couchdb::{CouchConfig, CouchStoryStore};

            let config = CouchConfig::from_env().context("reading CouchDB settings")?;
            tokio::spawn(storage_supervisor::run(state, move || {
                let config = config.clone();
                async move {
                    let store = CouchStoryStore::connect(config).await?;
                    Ok::<Arc<dyn StoryStore>, StorageError>(Arc::new(store))
                }
            }));
        }
        #[allow(unreachable_patterns)]
        other => bail!("storage backend {other:?} is not compiled in"),
    }
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}
