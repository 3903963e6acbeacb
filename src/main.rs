//! time-ledger server
//!
//! Boots the ledger engine over an in-process store seeded from the YAML
//! configuration and serves the HTTP API. A background task periodically
//! re-derives every hour-bank counter and reports drift.

use std::sync::Arc;
use std::time::Duration;

use time_ledger::api::{AppState, create_router};
use time_ledger::config::ConfigLoader;
use time_ledger::engine::Engine;
use time_ledger::store::MemoryStore;
use tracing::{error, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_RECONCILE_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "time_ledger=info".into()),
        )
        .init();

    let config_dir = env_or("LEDGER_CONFIG_DIR", DEFAULT_CONFIG_DIR);
    let bind_addr = env_or("LEDGER_BIND_ADDR", DEFAULT_BIND_ADDR);
    let reconcile_secs = match std::env::var("LEDGER_RECONCILE_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| format!("LEDGER_RECONCILE_SECS must be a number of seconds: {e}"))?,
        Err(_) => DEFAULT_RECONCILE_SECS,
    };

    let loader = ConfigLoader::load(&config_dir)?;
    info!(config_dir = %config_dir, "Configuration loaded");

    let engine = Arc::new(Engine::from_config(
        Arc::new(MemoryStore::new()),
        loader.config(),
    )?);

    spawn_reconciliation(Arc::clone(&engine), Duration::from_secs(reconcile_secs.max(1)));

    let app = create_router(AppState::from_shared(engine));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("time-ledger listening on {bind_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn spawn_reconciliation(engine: Arc<Engine>, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            match engine.reconcile_all() {
                Ok(reports) => {
                    let drifted = reports.iter().filter(|r| !r.consistent).count();
                    if drifted > 0 {
                        warn!(
                            employees = reports.len(),
                            drifted, "Hour-bank reconciliation found drift"
                        );
                    } else {
                        info!(employees = reports.len(), "Hour-bank reconciliation clean");
                    }
                }
                Err(e) => error!(error = %e, "Hour-bank reconciliation failed"),
            }
        }
    });
}
