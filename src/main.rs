use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::{signal, time};
use tracing::{error, info, warn};

mod api;
mod config;
mod controller;
mod errors;
mod events;
mod scheduler;
mod state;
mod store;
mod volumes;

#[cfg(test)]
mod tests;

use config::AppConfig;
use events::EventHub;
use volumes::DeviceSelector;
pub(crate) use state::{AppState, KeepAwakeState};

/// How long open connections may take to finish after a shutdown signal.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "disk_nosleep=info,tower_http=info".into()),
        )
        .init();

    info!("disk-nosleep v{} starting up", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!("Configuration loaded: port={}, volumes={:?}", config.port, config.volumes);

    let selector = DeviceSelector::from_config(&config)?;
    let event_hub = EventHub::new(256);
    let state = Arc::new(AppState::new(config.clone(), event_hub, selector));

    let volumes = state.selector.list_volumes();
    info!("Found {} usable volumes", volumes.len());

    match state.selector.default_volume(&volumes) {
        Some(volume) => state.begin_activation(volume).await?,
        None => warn!("No usable volume found; select one through the API"),
    }

    let bind_addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);

    let mut server = tokio::spawn(api::serve(listener, state.clone()));
    let served = tokio::select! {
        () = shutdown_signal() => {
            state.shutdown.cancel();
            time::timeout(DRAIN_GRACE, &mut server).await.ok()
        }
        joined = &mut server => Some(joined),
    };

    let served = match served {
        Some(Ok(result)) => result.map_err(anyhow::Error::from),
        Some(Err(e)) => Err(anyhow::Error::from(e)),
        None => {
            warn!("Connections still open after {:?}, closing them", DRAIN_GRACE);
            server.abort();
            Ok(())
        }
    };

    // A preparation still running would recreate the file after cleanup.
    if let Some(handle) = state.background_task.lock().await.take() {
        if let Err(e) = handle.await {
            warn!("Background volume preparation failed: {}", e);
        }
    }
    state.controller.shutdown().await;

    if let Err(e) = served {
        error!("HTTP server failed: {:#}", e);
        return Err(e);
    }

    info!("disk-nosleep shut down cleanly");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { warn!("Received Ctrl+C, shutting down..."); },
        () = terminate => { warn!("Received SIGTERM, shutting down..."); },
    }
}
