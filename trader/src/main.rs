use std::sync::Arc;

use common::logger::{LogFormat, init_logger};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::Instrument;

use trader::{
    analysis::{AnalysisSettings, SignalFrame, log_frames, run_analysis_loop},
    config::AppConfig,
    feed::{CoinbaseFeed, PriceFeed, Tick, run_ingest},
    registry::HistoryRegistry,
};

/// Spawns one feed worker per product plus the ingest pump that writes
/// their ticks into the registry's histories.
fn start_feeds(cfg: &AppConfig, registry: HistoryRegistry) -> Vec<JoinHandle<()>> {
    let (tick_tx, tick_rx) = mpsc::channel::<Tick>(cfg.tick_channel_capacity);

    let feed = Arc::new(CoinbaseFeed::new(
        cfg.feed_url.clone(),
        cfg.reconnect_delay,
        cfg.handshake_timeout,
    ));

    let mut handles = Vec::with_capacity(cfg.products.len() + 1);

    for product in &cfg.products {
        let feed = Arc::clone(&feed);
        let tx = tick_tx.clone();
        let product = product.clone();
        let span = tracing::info_span!("feed_task", product = %product);

        handles.push(tokio::spawn(
            async move {
                if let Err(e) = feed.stream_ticks(product, tx).await {
                    tracing::error!(error = ?e, "feed worker crashed");
                }
            }
            .instrument(span),
        ));
    }

    // Only the workers hold senders; the pump ends once they are all gone.
    drop(tick_tx);

    handles.push(tokio::spawn(async move {
        run_ingest(tick_rx, registry).await;
    }));

    handles
}

/// Spawns one analysis loop per distinct history and a frame logger.
fn start_analysis(cfg: &AppConfig, registry: &HistoryRegistry) -> Vec<JoinHandle<()>> {
    let (frame_tx, frame_rx) = broadcast::channel::<SignalFrame>(cfg.frame_channel_capacity);
    let settings = AnalysisSettings::from(cfg);

    let mut handles: Vec<JoinHandle<()>> = registry
        .histories()
        .iter()
        .map(|(label, history)| {
            tokio::spawn(run_analysis_loop(
                label.clone(),
                Arc::clone(history),
                settings,
                frame_tx.clone(),
            ))
        })
        .collect();

    handles.push(tokio::spawn(log_frames(frame_rx)));
    handles
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger("trader", LogFormat::from_env());

    tracing::info!("Starting trader...");

    let cfg = AppConfig::from_env()?;
    tracing::info!(?cfg, "configuration loaded");

    let registry = HistoryRegistry::from_config(&cfg);

    let mut tasks = start_feeds(&cfg, registry.clone());
    tasks.extend(start_analysis(&cfg, &registry));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    for t in &tasks {
        t.abort();
    }

    for (label, history) in registry.histories() {
        tracing::info!(history = %label, status = ?history.status(), "final history status");
    }

    Ok(())
}
