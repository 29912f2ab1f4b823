use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    // =========================
    // History configuration
    // =========================
    /// Number of ring slots per price history.
    ///
    /// Older ticks are silently overwritten once the ring is full.
    pub history_capacity: usize,

    /// When true every product writes into one shared history, mirroring a
    /// single-ring deployment. When false each product gets its own ring and
    /// its own analysis loop.
    pub shared_history: bool,

    // =========================
    // Analysis configuration
    // =========================
    /// Number of most recent samples handed to the strategy engine.
    pub analysis_window: usize,

    /// Frames are not published until a history holds at least this many
    /// samples.
    pub min_analysis_samples: usize,

    /// Cadence of the periodic analysis loop.
    pub analysis_interval: Duration,

    /// Buffer size of the frame broadcast. Slow subscribers that fall more
    /// than this many frames behind skip ahead.
    pub frame_channel_capacity: usize,

    // =========================
    // Feed configuration
    // =========================
    /// Ticker websocket endpoint.
    pub feed_url: String,

    /// Products to subscribe to, one feed task each.
    pub products: Vec<String>,

    /// Pause between a dropped connection and the next attempt.
    pub reconnect_delay: Duration,

    /// Upper bound on the websocket handshake.
    pub handshake_timeout: Duration,

    /// Capacity of the channel between feed tasks and the ingest pump.
    pub tick_channel_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let products: Vec<String> = lookup("FEED_PRODUCTS")
            .unwrap_or_else(|| "BTC-USD,ETH-USD,SOL-USD".to_string())
            .split(',')
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())
            .collect();

        if products.is_empty() {
            return Err(AppError::NoProducts);
        }

        let cfg = Self {
            history_capacity: positive(&lookup, "HISTORY_CAPACITY", 1_000)?,
            shared_history: parse(&lookup, "SHARED_HISTORY", true)?,

            analysis_window: positive(&lookup, "ANALYSIS_WINDOW", 100)?,
            min_analysis_samples: parse(&lookup, "MIN_ANALYSIS_SAMPLES", 20)?,
            analysis_interval: Duration::from_millis(positive(
                &lookup,
                "ANALYSIS_INTERVAL_MS",
                1_000,
            )?),
            frame_channel_capacity: positive(&lookup, "FRAME_CHANNEL_CAPACITY", 64)?,

            feed_url: lookup("FEED_URL")
                .unwrap_or_else(|| "wss://ws-feed.exchange.coinbase.com".to_string()),
            products,
            reconnect_delay: Duration::from_millis(parse(&lookup, "RECONNECT_DELAY_MS", 5_000)?),
            handshake_timeout: Duration::from_millis(positive(
                &lookup,
                "HANDSHAKE_TIMEOUT_MS",
                10_000,
            )?),
            tick_channel_capacity: positive(&lookup, "TICK_CHANNEL_CAPACITY", 1_024)?,
        };

        // A frame needs `min_analysis_samples` out of an `analysis_window` read.
        if cfg.min_analysis_samples > cfg.analysis_window {
            return Err(AppError::InvalidConfig {
                key: "MIN_ANALYSIS_SAMPLES",
                value: cfg.min_analysis_samples.to_string(),
                reason: format!(
                    "exceeds ANALYSIS_WINDOW ({}); no frame could ever be published",
                    cfg.analysis_window
                ),
            });
        }

        Ok(cfg)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| AppError::InvalidConfig {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn positive<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let v = parse(lookup, key, default)?;
    if v <= T::default() {
        return Err(AppError::InvalidConfig {
            key,
            value: v.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_match_a_single_shared_ring() {
        let c = cfg(&[]).unwrap();

        assert_eq!(c.history_capacity, 1_000);
        assert!(c.shared_history);
        assert_eq!(c.analysis_window, 100);
        assert_eq!(c.min_analysis_samples, 20);
        assert_eq!(c.analysis_interval, Duration::from_secs(1));
        assert_eq!(c.products, vec!["BTC-USD", "ETH-USD", "SOL-USD"]);
        assert_eq!(c.reconnect_delay, Duration::from_secs(5));
        assert_eq!(c.handshake_timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_are_parsed() {
        let c = cfg(&[
            ("HISTORY_CAPACITY", "250"),
            ("SHARED_HISTORY", "false"),
            ("ANALYSIS_INTERVAL_MS", "200"),
            ("FEED_PRODUCTS", " eth-usd , ,btc-usd"),
        ])
        .unwrap();

        assert_eq!(c.history_capacity, 250);
        assert!(!c.shared_history);
        assert_eq!(c.analysis_interval, Duration::from_millis(200));
        assert_eq!(c.products, vec!["ETH-USD", "BTC-USD"]);
    }

    #[test]
    fn garbage_is_rejected_with_its_key() {
        let err = cfg(&[("HISTORY_CAPACITY", "lots")]).unwrap_err();

        match err {
            AppError::InvalidConfig { key, value, .. } => {
                assert_eq!(key, "HISTORY_CAPACITY");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(cfg(&[("HISTORY_CAPACITY", "0")]).is_err());
        assert!(cfg(&[("ANALYSIS_WINDOW", "0")]).is_err());
        assert!(cfg(&[("ANALYSIS_INTERVAL_MS", "0")]).is_err());
    }

    #[test]
    fn warm_up_larger_than_window_is_rejected() {
        let err = cfg(&[("ANALYSIS_WINDOW", "30"), ("MIN_ANALYSIS_SAMPLES", "31")]).unwrap_err();

        match err {
            AppError::InvalidConfig { key, value, .. } => {
                assert_eq!(key, "MIN_ANALYSIS_SAMPLES");
                assert_eq!(value, "31");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Equal is fine: a full window is enough.
        let c = cfg(&[("ANALYSIS_WINDOW", "30"), ("MIN_ANALYSIS_SAMPLES", "30")]).unwrap();
        assert_eq!(c.min_analysis_samples, c.analysis_window);
    }

    #[test]
    fn empty_product_list_is_rejected() {
        assert!(matches!(
            cfg(&[("FEED_PRODUCTS", " , ")]),
            Err(AppError::NoProducts)
        ));
    }
}
