//! Selectrix service library.
//!
//! Keeps a large universe of items split into an available set and an ordered
//! selection, and applies client edits in periodic batches. It handles:
//! - Store construction and seeding
//! - Queueing of mutating requests and their batch application
//! - Live broadcast of change events
//! - The HTTP request layer and process entry point
//!
//! # Architecture
//!
//! - `core`: shared item types and paginated read views
//! - `store`: item repository, selection order and mutation queue
//! - `runtime`: batch scheduler and task application
//! - `bus`: event bus for live change notifications
//! - `commands`: HTTP handlers (request entry points)
//! - `config`: environment settings

pub mod bus;
pub mod commands;
pub mod config;
pub mod core;
pub mod runtime;
pub mod store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::watch;

use bus::EventBus;
use config::AppConfig;
use crate::core::{ItemId, QueryService};
use runtime::{BatchScheduler, SchedulerHandle};
use store::{ItemStore, MutationQueue, StoreError};

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("item {0} already exists")]
    AlreadyExists(ItemId),
    #[error("{0}")]
    Config(#[from] config::ConfigError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::AlreadyExists(id) => Self::AlreadyExists(id),
            other => Self::Other(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Composition root
// ---------------------------------------------------------------------------

/// Everything the request layer needs, constructed once and shared.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ItemStore>,
    pub queue: Arc<MutationQueue>,
    pub bus: Arc<EventBus>,
    pub scheduler: Arc<BatchScheduler>,
    pub query: QueryService,
    closing: Arc<watch::Sender<bool>>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_store(ItemStore::seeded(1..=config.store_size), config)
    }

    pub fn with_store(store: ItemStore, config: &AppConfig) -> Self {
        let store = Arc::new(store);
        let queue = Arc::new(MutationQueue::new(store.clone()));
        let bus = Arc::new(EventBus::with_capacity(config.event_capacity));
        let scheduler = Arc::new(BatchScheduler::new(store.clone(), queue.clone(), bus.clone()));
        let query = QueryService::with_max_limit(store.clone(), config.max_page_limit);
        let (closing, _) = watch::channel(false);
        Self {
            store,
            queue,
            bus,
            scheduler,
            query,
            closing: Arc::new(closing),
        }
    }

    /// Tell long-lived streams to finish so the server can drain.
    pub fn begin_shutdown(&self) {
        self.closing.send_replace(true);
    }

    /// Resolves once `begin_shutdown` has been called.
    pub fn closed(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.closing.subscribe();
        async move {
            let _ = rx.wait_for(|closing| *closing).await;
        }
    }

    pub fn start_scheduler(&self, config: &AppConfig) -> SchedulerHandle {
        self.scheduler.clone().start(config.scheduler)
    }
}

// ---------------------------------------------------------------------------
// Application entry point
// ---------------------------------------------------------------------------

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("selectrix=debug,info")),
        )
        .init();
}

pub async fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(store_size = config.store_size, "seeding item store");
    let state = AppState::new(&config);
    let scheduler = state.start_scheduler(&config);

    let app = commands::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Selectrix listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    scheduler.shutdown().await;
    tracing::info!("Selectrix stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested, closing event streams");
    state.begin_shutdown();
}
