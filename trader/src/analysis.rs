//! Periodic signal publication.
//!
//! Each analysis loop owns one price history: on every tick it copies the
//! most recent window out of the ring, runs the strategy engine on the copy
//! and broadcasts the result as a `SignalFrame`. No lock is held while the
//! strategies run.
//!
//! Data flow:
//! PriceHistory → read_last → analyze_all → broadcast<SignalFrame>

use std::sync::Arc;
use std::time::Duration;

use common::logger::{TraceId, root_span};
use market::{AnalysisResult, PriceHistory, analyze_all};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument, trace, warn};

use crate::config::AppConfig;
use crate::time::now_secs;

/// One published analysis, as pushed to stream subscribers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalFrame {
    /// Product id, or the shared label when all products share one ring.
    pub product: String,
    /// Latest price in the analysed snapshot.
    pub price: f64,
    /// Ring write cursor at snapshot time.
    pub buffer_index: usize,
    pub signals: AnalysisResult,
    /// Seconds since epoch.
    pub timestamp: i64,
}

#[derive(Clone, Copy, Debug)]
pub struct AnalysisSettings {
    pub window: usize,
    pub min_samples: usize,
    pub interval: Duration,
}

impl From<&AppConfig> for AnalysisSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            window: cfg.analysis_window,
            min_samples: cfg.min_analysis_samples,
            interval: cfg.analysis_interval,
        }
    }
}

/// Analyse the latest `window` samples; `None` while still warming up.
pub fn build_frame(
    product: &str,
    history: &PriceHistory,
    window: usize,
    min_samples: usize,
    timestamp: i64,
) -> Option<SignalFrame> {
    let snap = history.snapshot(window);
    if snap.prices.len() < min_samples {
        return None;
    }

    let price = *snap.prices.last()?;
    let signals = analyze_all(&snap.prices);

    Some(SignalFrame {
        product: product.to_string(),
        price,
        buffer_index: snap.write_index,
        signals,
        timestamp,
    })
}

/// On-demand analysis of the latest `window` samples, warm or not.
pub fn signals_snapshot(history: &PriceHistory, window: usize) -> AnalysisResult {
    analyze_all(&history.read_last(window))
}

/// Publishes a frame for `history` on every interval tick. Runs until aborted.
#[instrument(skip(product, history, settings, tx), fields(product = %product))]
pub async fn run_analysis_loop(
    product: String,
    history: Arc<PriceHistory>,
    settings: AnalysisSettings,
    tx: broadcast::Sender<SignalFrame>,
) {
    let mut ticker = interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        window = settings.window,
        min_samples = settings.min_samples,
        every_ms = settings.interval.as_millis() as u64,
        "analysis loop started"
    );

    loop {
        ticker.tick().await;

        let trace_id = TraceId::default();
        let span = root_span("analysis_cycle", &trace_id);
        span.record("product", product.as_str());

        let frame = span.in_scope(|| {
            build_frame(
                &product,
                &history,
                settings.window,
                settings.min_samples,
                now_secs(),
            )
        });

        let Some(frame) = frame else {
            debug!(filled = history.filled_count(), "warming up; no frame published");
            continue;
        };

        debug!(
            price = frame.price,
            consensus = %frame.signals.consensus,
            "frame built"
        );

        if tx.send(frame).is_err() {
            trace!("no frame subscribers");
        }
    }
}

/// Logs every frame at `info`. Exits when the broadcast closes.
pub async fn log_frames(mut rx: broadcast::Receiver<SignalFrame>) {
    loop {
        match rx.recv().await {
            Ok(f) => info!(
                product = %f.product,
                price = f.price,
                buffer_index = f.buffer_index,
                consensus = %f.signals.consensus,
                mean_reversion = ?f.signals.mean_reversion.direction,
                momentum = ?f.signals.momentum.direction,
                breakout = ?f.signals.breakout.direction,
                rsi = ?f.signals.rsi.direction,
                "signal frame"
            ),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "frame logger lagging; skipped frames");
            }
            Err(RecvError::Closed) => {
                info!("frame broadcast closed");
                return;
            }
        }
    }
}
