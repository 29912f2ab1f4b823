//! RSI (Relative Strength Index)
//!
//! Simple-average RSI over the last 14 tick-over-tick changes:
//!
//! ```text
//! rs  = avg_gain / avg_loss
//! rsi = 100 - 100 / (1 + rs)
//! ```
//!
//! | rsi        | call | strength            |
//! |------------|------|---------------------|
//! | < 30       | BUY  | (30 - rsi) * 3.33   |
//! | > 70       | SELL | (rsi - 70) * 3.33   |
//! | [30, 40]   | BUY  | 40                  |
//! | [60, 70]   | SELL | 40                  |
//! | otherwise  | NEUTRAL | 50               |
//!
//! With no losses at all the index is pinned at 100 (SELL, full strength),
//! unless there were no gains either.

use super::{Signal, Strategy, clamp_strength};

const PERIOD: usize = 14;
const STRENGTH_SCALE: f64 = 3.33;

#[derive(Clone, Copy, Debug, Default)]
pub struct Rsi;

/// Average gain and average loss over the last `PERIOD` changes.
fn average_moves(prices: &[f64]) -> (f64, f64) {
    let (gains, losses) = prices[prices.len() - PERIOD - 1..]
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), change: f64| {
            if change > 0.0 {
                (g + change, l)
            } else {
                (g, l + change.abs())
            }
        });

    (gains / PERIOD as f64, losses / PERIOD as f64)
}

impl Strategy for Rsi {
    fn name(&self) -> &'static str {
        "rsi"
    }

    fn min_samples(&self) -> usize {
        PERIOD + 1
    }

    fn evaluate(&self, prices: &[f64]) -> Signal {
        let (avg_gain, avg_loss) = average_moves(prices);

        if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                return Signal::neutral(50, "No price movement detected");
            }
            return Signal::sell(100, "RSI: 100 (extreme overbought)");
        }

        let rsi = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);

        if rsi < 30.0 {
            Signal::buy(
                clamp_strength((30.0 - rsi) * STRENGTH_SCALE),
                format!("RSI oversold: {rsi:.1} (< 30)"),
            )
        } else if rsi > 70.0 {
            Signal::sell(
                clamp_strength((rsi - 70.0) * STRENGTH_SCALE),
                format!("RSI overbought: {rsi:.1} (> 70)"),
            )
        } else if rsi <= 40.0 {
            Signal::buy(40, format!("RSI approaching oversold: {rsi:.1}"))
        } else if rsi >= 60.0 {
            Signal::sell(40, format!("RSI approaching overbought: {rsi:.1}"))
        } else {
            Signal::neutral(50, format!("RSI neutral: {rsi:.1}"))
        }
    }
}
