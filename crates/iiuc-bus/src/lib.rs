//! Schedule search, chat assistant and dashboard API for the IIUC university
//! bus service.
//!
//! The timetable is bundled with the binary, so `/schedules` and the assistant
//! work on their own. Sign-in and the role dashboards proxy a hosted
//! Supabase-style backend and answer `503` until `backend.url` and
//! `backend.anon_key` are configured.
//!
//! # Configuration
//! Settings come from an optional `config.toml` next to the binary, overridden
//! by `IIUC_BUS__*` environment variables, e.g.
//! ```sh
//! IIUC_BUS__BACKEND__URL=https://abc.supabase.co
//! IIUC_BUS__BACKEND__ANON_KEY=...
//! IIUC_BUS__SERVER__PORT=8080
//! RUST_LOG=iiuc_bus=debug
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

pub mod assistant;
pub mod backend;
pub mod schedule;
pub mod server;
pub mod session;
pub mod settings;
pub mod types;

use schedule::ScheduleDataset;
use settings::Settings;
use types::AppState;

/// Builds the shared state from `settings`, loading the timetable it points at.
pub fn build_state(settings: Settings) -> anyhow::Result<Arc<AppState>> {
    let dataset = ScheduleDataset::load(settings.schedules.path.as_deref())
        .context("Failed to load schedule data")?;
    info!(schedules = dataset.len(), "Loaded schedule data");

    let state = AppState::new(settings, dataset).context("Failed to create backend client")?;
    if !state.backend.is_configured() {
        warn!("Hosted backend is not configured, running in offline mode");
    }
    Ok(Arc::new(state))
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let settings = Settings::new().context("Failed to read settings")?;
    let address = settings.server.address();
    let state = build_state(settings)?;
    spawn_cache_cleanup(state.clone());

    let app = server::create_router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Periodically drops expired profiles from the cache.
fn spawn_cache_cleanup(state: Arc<AppState>) {
    let period = state.settings.cache.profile_ttl().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let before = state.profiles.len();
            state.profiles.cleanup_expired();
            let removed = before.saturating_sub(state.profiles.len());
            if removed > 0 {
                debug!(removed = removed, "Removed expired profiles");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
