//! Strategy Engine
//!
//! Four independent technical-analysis strategies evaluated over the same
//! price snapshot, reconciled into one consensus call.
//!
//! Every strategy:
//! - is pure and deterministic given its input slice
//! - reports `Neutral` with strength 0 until it has enough history
//! - clamps its strength into `[0, 100]`
//!
//! Any I/O (feeds, locks, logging of results) lives outside this module.

pub mod breakout;
pub mod consensus;
pub mod mean_reversion;
pub mod momentum;
pub mod rsi;

use serde::{Deserialize, Serialize};
use tracing::trace;

pub use breakout::Breakout;
pub use consensus::{Consensus, consensus};
pub use mean_reversion::MeanReversion;
pub use momentum::Momentum;
pub use rsi::Rsi;

/// Direction of a single strategy call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
    Neutral,
}

/// One strategy's verdict on a price snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub direction: Direction,

    /// Confidence in `[0, 100]`.
    pub strength: u8,

    /// Display text, never parsed.
    pub reason: String,
}

impl Signal {
    pub fn buy(strength: u8, reason: impl Into<String>) -> Self {
        Self::new(Direction::Buy, strength, reason)
    }

    pub fn sell(strength: u8, reason: impl Into<String>) -> Self {
        Self::new(Direction::Sell, strength, reason)
    }

    pub fn neutral(strength: u8, reason: impl Into<String>) -> Self {
        Self::new(Direction::Neutral, strength, reason)
    }

    /// Warm-up result for a strategy that needs `min_samples` prices.
    pub fn insufficient(min_samples: usize) -> Self {
        Self::neutral(0, format!("Need at least {min_samples} data points"))
    }

    fn new(direction: Direction, strength: u8, reason: impl Into<String>) -> Self {
        Self {
            direction,
            strength: strength.min(100),
            reason: reason.into(),
        }
    }
}

/// Truncate a fractional confidence into `[0, 100]`. NaN maps to 0.
pub(crate) fn clamp_strength(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 100.0) as u8
}

/// A price-history strategy.
///
/// Implementors only provide `evaluate`, which may assume at least
/// `min_samples()` prices. Callers go through `analyze`, which applies the
/// warm-up guard.
pub trait Strategy {
    fn name(&self) -> &'static str;

    fn min_samples(&self) -> usize;

    /// Raw evaluation without the warm-up guard.
    ///
    /// # Panics
    ///
    /// Panics if `prices` holds fewer than `min_samples()` samples. Use
    /// `analyze` unless the length has already been checked.
    fn evaluate(&self, prices: &[f64]) -> Signal;

    fn analyze(&self, prices: &[f64]) -> Signal {
        if prices.len() < self.min_samples() {
            trace!(
                strategy = self.name(),
                have = prices.len(),
                need = self.min_samples(),
                "insufficient history"
            );
            return Signal::insufficient(self.min_samples());
        }
        self.evaluate(prices)
    }
}

/// All four strategy calls plus their consensus, for one snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub mean_reversion: Signal,
    pub momentum: Signal,
    pub breakout: Signal,
    pub rsi: Signal,
    pub consensus: Consensus,
}

impl AnalysisResult {
    /// The four strategy signals in a fixed order.
    pub fn signals(&self) -> [&Signal; 4] {
        [&self.mean_reversion, &self.momentum, &self.breakout, &self.rsi]
    }
}

/// Run every strategy over `prices` (oldest first) and vote.
pub fn analyze_all(prices: &[f64]) -> AnalysisResult {
    let mean_reversion = MeanReversion.analyze(prices);
    let momentum = Momentum.analyze(prices);
    let breakout = Breakout.analyze(prices);
    let rsi = Rsi.analyze(prices);

    let consensus = consensus([&mean_reversion, &momentum, &breakout, &rsi]);

    AnalysisResult {
        mean_reversion,
        momentum,
        breakout,
        rsi,
        consensus,
    }
}
