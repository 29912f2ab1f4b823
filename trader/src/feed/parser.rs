use serde::Deserialize;

use super::{FeedError, Tick};

/// Subset of the Coinbase Exchange feed messages we care about.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum FeedMessage {
    Ticker(TickerMessage),
    Error {
        message: String,
        #[serde(default)]
        reason: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TickerMessage {
    product_id: String,
    price: String,
    #[serde(default)]
    time: Option<String>,
}

/// Decode one raw feed message.
///
/// - `Ok(Some(tick))` for a ticker with a usable price
/// - `Ok(None)` for control traffic (subscriptions, heartbeats, ...)
/// - `Err(_)` for malformed JSON, bad prices, or an explicit error message
pub fn parse_ticker(raw: &str, received_ms: u64) -> Result<Option<Tick>, FeedError> {
    let msg: FeedMessage = serde_json::from_str(raw)?;

    match msg {
        FeedMessage::Ticker(t) => {
            let price = parse_price(&t.product_id, &t.price)?;
            Ok(Some(Tick {
                product_id: t.product_id,
                price,
                exchange_time: t.time,
                received_ms,
            }))
        }
        FeedMessage::Error { message, reason } => Err(FeedError::Remote(match reason {
            Some(r) => format!("{message}: {r}"),
            None => message,
        })),
        FeedMessage::Other => Ok(None),
    }
}

/// Prices arrive as decimal strings; anything non-finite or non-positive is rejected.
fn parse_price(product: &str, raw: &str) -> Result<f64, FeedError> {
    let invalid = || FeedError::InvalidPrice {
        product: product.to_string(),
        raw: raw.to_string(),
    };

    let price: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !price.is_finite() || price <= 0.0 {
        return Err(invalid());
    }
    Ok(price)
}
