use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("malformed feed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid price {raw:?} for {product}")]
    InvalidPrice { product: String, raw: String },

    #[error("feed rejected request: {0}")]
    Remote(String),

    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    #[error("tick receiver dropped")]
    ChannelClosed,
}
