//! Expiring Cache demo
//!
//! Runs a self-updating counter and an expiring entry side by side and logs
//! what the cache reports until the run time elapses or a shutdown signal
//! arrives.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiring_cache::{update_fn, Cache, Config};

const COUNTER_KEY: &str = "counter";
const SESSION_KEY: &str = "session";

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Store a self-updating counter and an expiring session entry
/// 4. Report the cache state until the run time elapses or a signal arrives
/// 5. Clear the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiring_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Expiring Cache demo");

    let config = Config::from_env();
    info!(
        "Configuration loaded: ttl={}s, update_interval={}ms, run={}s, report_interval={}ms",
        config.ttl_secs, config.update_interval_ms, config.run_secs, config.report_interval_ms
    );

    let cache: Cache<String, u64> = Cache::new();
    cache
        .store_with_update(
            COUNTER_KEY.to_string(),
            0,
            Some(update_fn(|v: &u64| v + 1)),
            config.update_interval(),
        )
        .await
        .context("failed to store the counter")?;
    cache
        .store_with_expiration(SESSION_KEY.to_string(), 1, config.ttl())
        .await
        .context("failed to store the session")?;

    tokio::select! {
        result = report(&cache, config.report_interval()) => result?,
        _ = tokio::time::sleep(config.run_time()) => {
            info!("Run time elapsed, shutting down...");
        }
        _ = shutdown_signal() => {}
    }

    cache.clear().await;
    info!("Demo finished");
    Ok(())
}

/// Logs the counter and the entry snapshots every `every`.
async fn report(cache: &Cache<String, u64>, every: Duration) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(every.max(Duration::from_millis(1)));
    loop {
        ticker.tick().await;

        let counter = cache.get(&COUNTER_KEY.to_string()).await?;
        info!("{} = {}", COUNTER_KEY, counter);

        for key in cache.keys().await {
            match cache.describe(&key).await {
                Ok(snapshot) => info!("{}: {}", key, serde_json::to_string(&snapshot)?),
                Err(e) if e.is_does_not_exist() => warn!("{} vanished while reporting", key),
                Err(e) => return Err(e.into()),
            }
        }

        if !cache.contains_key(&SESSION_KEY.to_string()).await {
            info!("{} has expired", SESSION_KEY);
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
