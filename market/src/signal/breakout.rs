//! Breakout
//!
//! Compares the latest price against the high/low of the preceding range
//! (the 50-sample lookback minus the latest tick itself).
//!
//! - Above the range high: breakout, BUY at `50 + excess‰`.
//! - Below the range low: breakdown, SELL at `50 + shortfall‰`.
//! - Inside the range: the top and bottom 10% are treated as resistance
//!   and support.
//!
//! A flat range (`high == low`) has no interior to position the price in and
//! is reported as neutral.

use super::{Signal, Strategy, clamp_strength};

const LOOKBACK: usize = 50;

#[derive(Clone, Copy, Debug, Default)]
pub struct Breakout;

impl Strategy for Breakout {
    fn name(&self) -> &'static str {
        "breakout"
    }

    fn min_samples(&self) -> usize {
        LOOKBACK
    }

    fn evaluate(&self, prices: &[f64]) -> Signal {
        let len = prices.len();
        let p_now = prices[len - 1];

        let range = &prices[len - LOOKBACK..len - 1];
        let (low, high) = range
            .iter()
            .fold((range[0], range[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));

        if p_now > high {
            let excess = (p_now - high) / high * 1_000.0;
            return Signal::buy(
                clamp_strength(50.0 + excess),
                format!("Breakout above resistance: ${p_now:.2} (was ${high:.2})"),
            );
        }

        if p_now < low {
            let shortfall = (low - p_now) / low * 1_000.0;
            return Signal::sell(
                clamp_strength(50.0 + shortfall),
                format!("Breakdown below support: ${p_now:.2} (was ${low:.2})"),
            );
        }

        let width = high - low;
        if width <= 0.0 {
            return Signal::neutral(50, format!("Flat range at ${high:.2}"));
        }

        let position = (p_now - low) / width * 100.0;
        if position > 90.0 {
            Signal::sell(60, format!("Near resistance at ${high:.2}"))
        } else if position < 10.0 {
            Signal::buy(60, format!("Near support at ${low:.2}"))
        } else {
            Signal::neutral(50, format!("Within range: ${low:.2} - ${high:.2}"))
        }
    }
}
