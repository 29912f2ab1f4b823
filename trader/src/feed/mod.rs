//! Market-data ingestion.
//!
//! Feed workers own their websocket connection and forward validated ticks
//! over an mpsc channel; the ingest pump is the only place that writes into
//! the price histories.
//!
//! Data flow:
//! Feed → mpsc → run_ingest → PriceHistory::append

pub mod coinbase;
pub mod errors;
pub mod parser;

use async_trait::async_trait;
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::{debug, info, warn};

use crate::registry::HistoryRegistry;

pub use coinbase::CoinbaseFeed;
pub use errors::FeedError;

/// One validated trade print.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub product_id: String,

    /// Finite and strictly positive.
    pub price: f64,

    /// Exchange timestamp as sent by the venue, if any.
    pub exchange_time: Option<String>,

    /// Local receive time (ms since epoch).
    pub received_ms: u64,
}

/// A source of ticks for a single product.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Stream ticks for `product` into `sender`.
    ///
    /// Implementations reconnect on their own and only return once the
    /// receiving side is gone.
    async fn stream_ticks(&self, product: String, sender: Sender<Tick>) -> anyhow::Result<()>;
}

/// Appends every received tick to the history registered for its product.
///
/// Returns the number of ticks appended once all senders are dropped.
pub async fn run_ingest(mut rx: Receiver<Tick>, histories: HistoryRegistry) -> u64 {
    info!(products = ?histories.products().collect::<Vec<_>>(), "ingest pump started");

    let mut appended = 0u64;
    while let Some(tick) = rx.recv().await {
        let Some(history) = histories.get(&tick.product_id) else {
            warn!(product = %tick.product_id, "tick for unregistered product dropped");
            continue;
        };

        history.append(tick.price);
        appended += 1;

        debug!(
            product = %tick.product_id,
            price = tick.price,
            filled = history.filled_count(),
            "tick appended"
        );
    }

    warn!(appended, "ingest pump stopped: all feeds closed");
    appended
}
