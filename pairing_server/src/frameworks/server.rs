// Framework bootstrap for the pairing server runtime.

use crate::frameworks::config::{self, Settings, StoreBackend};
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::interface_adapters::stores::{MemoryStore, RedisStore};
use crate::use_cases::{PairingStrategy, QueueBackedPairing, SelfPairing};
use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Serve the matchmaking API on an already bound listener.
pub async fn serve(listener: tokio::net::TcpListener, settings: Settings) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state(&settings).await?;

    // Wire the HTTP routes for the matchmaking API.
    let app = routes::app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking.
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::from_env();
    let address = SocketAddr::from(([127, 0, 0, 1], settings.http_port));

    // Bind TCP listener with error handling.
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    serve(listener, settings).await
}

async fn build_state(settings: &Settings) -> Result<Arc<AppState>> {
    let pairing: Arc<dyn PairingStrategy> = if settings.self_pair_mode {
        tracing::warn!("self-pair mode enabled, the waiting queue is bypassed");
        Arc::new(SelfPairing)
    } else {
        match &settings.store {
            StoreBackend::Redis { url } => {
                let store = RedisStore::connect(url, settings.keys.clone(), settings.store_timeout)
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            store = %config::redacted_store_location(url),
                            error = %e,
                            "failed to connect to queue store"
                        );
                        std::io::Error::other(format!("failed to connect to queue store: {e}"))
                    })?;
                tracing::debug!(
                    store = %config::redacted_store_location(url),
                    queue = %settings.keys.queue,
                    store_timeout_ms = settings.store_timeout.as_millis(),
                    "redis queue store configured"
                );
                Arc::new(QueueBackedPairing {
                    queue: store.clone(),
                    assignments: store,
                    clock: SystemClock,
                    settings: settings.pairing.clone(),
                })
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory queue store, state is lost on restart");
                let store = MemoryStore::new(Arc::new(SystemClock));
                Arc::new(QueueBackedPairing {
                    queue: store.clone(),
                    assignments: store,
                    clock: SystemClock,
                    settings: settings.pairing.clone(),
                })
            }
        }
    };

    Ok(Arc::new(AppState { pairing }))
}
