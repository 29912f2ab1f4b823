use std::time::Duration;

use async_trait::async_trait;
use common::logger::{child_span, warn_if_slow};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header::USER_AGENT};
use tracing::{Instrument, debug, error, info, instrument, trace, warn};

use super::parser::parse_ticker;
use super::{FeedError, PriceFeed, Tick};
use crate::time::now_ms;

const CLIENT_USER_AGENT: &str = "trader/0.1 (+tokio-tungstenite)";

/// Handshakes slower than this are reported even when they succeed.
const SLOW_HANDSHAKE: Duration = Duration::from_secs(2);

/// Ticker-channel client for the Coinbase Exchange websocket feed.
pub struct CoinbaseFeed {
    pub ws_url: String,
    pub reconnect_delay: Duration,
    pub handshake_timeout: Duration,
}

impl CoinbaseFeed {
    pub fn new(ws_url: String, reconnect_delay: Duration, handshake_timeout: Duration) -> Self {
        Self {
            ws_url,
            reconnect_delay,
            handshake_timeout,
        }
    }

    /// Subscription request for the ticker channel of one product.
    pub fn subscribe_message(product: &str) -> serde_json::Value {
        json!({
            "type": "subscribe",
            "product_ids": [product],
            "channels": ["ticker"],
        })
    }

    /// One connection lifetime: connect, subscribe, forward ticks until the
    /// socket dies.
    ///
    /// `Ok(())` means the remote closed the stream cleanly.
    async fn session(&self, product: &str, sender: &Sender<Tick>) -> Result<(), FeedError> {
        let mut request = self.ws_url.as_str().into_client_request()?;
        request
            .headers_mut()
            .insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let (ws, _) = tokio::time::timeout(
            self.handshake_timeout,
            warn_if_slow("feed_handshake", SLOW_HANDSHAKE, connect_async(request)),
        )
        .await
        .map_err(|_| FeedError::HandshakeTimeout(self.handshake_timeout))??;

        info!("WebSocket connection established");
        let (mut write, mut read) = ws.split();

        let text = serde_json::to_string(&Self::subscribe_message(product))?;
        debug!(payload = %text, "Sending ticker subscription");
        write.send(Message::Text(text.into())).await?;

        while let Some(msg) = read.next().await {
            let raw = match msg? {
                Message::Text(t) => t,
                Message::Close(frame) => {
                    info!(?frame, "Feed closed by remote");
                    return Ok(());
                }
                other => {
                    trace!(msg_type = ?other, "Ignoring non-text WebSocket message");
                    continue;
                }
            };

            trace!(raw_event = %raw.as_str(), "Received raw WebSocket message");

            match parse_ticker(raw.as_str(), now_ms()) {
                Ok(Some(tick)) => {
                    sender
                        .send(tick)
                        .await
                        .map_err(|_| FeedError::ChannelClosed)?;
                }
                Ok(None) => debug!("Received non-ticker feed message"),
                Err(e @ FeedError::Remote(_)) => return Err(e),
                Err(e) => warn!(error = %e, raw = %raw.as_str(), "Failed to parse feed message"),
            }
        }

        Ok(())
    }
}

#[async_trait]
impl PriceFeed for CoinbaseFeed {
    #[instrument(skip(self, sender), fields(url = %self.ws_url))]
    async fn stream_ticks(&self, product: String, sender: Sender<Tick>) -> anyhow::Result<()> {
        info!("Starting ticker feed worker");

        loop {
            let result = self
                .session(&product, &sender)
                .instrument(child_span("feed_session"))
                .await;

            match result {
                Ok(()) => warn!("Feed stream ended"),
                Err(FeedError::ChannelClosed) => {
                    info!("Tick receiver dropped; feed worker shutting down");
                    return Ok(());
                }
                Err(e) => error!(error = %e, "Feed session failed"),
            }

            if sender.is_closed() {
                return Ok(());
            }

            warn!(interval = ?self.reconnect_delay, "Disconnected; attempting reconnection");
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }
}
