//! Consensus voting
//!
//! Each strategy's strength acts as its conviction weight (`strength / 100`).
//! Buy and sell weights are expressed as a percentage of the total weight,
//! then a ladder escalates the call only when both *breadth* (how many
//! strategies agree) and *conviction* (weighted share) clear its thresholds:
//!
//! ```text
//! buys  >= 3 && buy%  > 60  -> STRONG BUY
//! sells >= 3 && sell% > 60  -> STRONG SELL
//! buys  >= 2 && buy%  > 50  -> BUY
//! sells >= 2 && sell% > 50  -> SELL
//! buys  > sells && buy%  > 40 -> BUY
//! sells > buys  && sell% > 40 -> SELL
//! otherwise                   -> NEUTRAL
//! ```

use serde::{Deserialize, Serialize};

use super::{Direction, Signal};

/// Combined call across all strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Consensus {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
    #[serde(rename = "NEUTRAL")]
    Neutral,
}

impl Consensus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG BUY",
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG SELL",
            Self::Neutral => "NEUTRAL",
        }
    }
}

impl std::fmt::Display for Consensus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted shares and raw tallies behind a consensus call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tally {
    /// Buy weight as a percentage of total weight.
    pub buy_score: f64,
    /// Sell weight as a percentage of total weight.
    pub sell_score: f64,
    pub buy_count: usize,
    pub sell_count: usize,
    pub neutral_count: usize,
}

impl Tally {
    pub fn from_signals<'a>(signals: impl IntoIterator<Item = &'a Signal>) -> Self {
        let mut t = Tally::default();
        let mut total_weight = 0.0;

        for sig in signals {
            let weight = f64::from(sig.strength) / 100.0;
            match sig.direction {
                Direction::Buy => {
                    t.buy_score += weight;
                    t.buy_count += 1;
                }
                Direction::Sell => {
                    t.sell_score += weight;
                    t.sell_count += 1;
                }
                Direction::Neutral => t.neutral_count += 1,
            }
            total_weight += weight;
        }

        if total_weight > 0.0 {
            t.buy_score = t.buy_score / total_weight * 100.0;
            t.sell_score = t.sell_score / total_weight * 100.0;
        }

        t
    }

    pub fn decide(&self) -> Consensus {
        let Tally {
            buy_score,
            sell_score,
            buy_count,
            sell_count,
            ..
        } = *self;

        if buy_count >= 3 && buy_score > 60.0 {
            Consensus::StrongBuy
        } else if sell_count >= 3 && sell_score > 60.0 {
            Consensus::StrongSell
        } else if buy_count >= 2 && buy_score > 50.0 {
            Consensus::Buy
        } else if sell_count >= 2 && sell_score > 50.0 {
            Consensus::Sell
        } else if buy_count > sell_count && buy_score > 40.0 {
            Consensus::Buy
        } else if sell_count > buy_count && sell_score > 40.0 {
            Consensus::Sell
        } else {
            Consensus::Neutral
        }
    }
}

/// Reconcile strategy signals into one call.
pub fn consensus<'a>(signals: impl IntoIterator<Item = &'a Signal>) -> Consensus {
    Tally::from_signals(signals).decide()
}
