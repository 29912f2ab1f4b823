//! Momentum
//!
//! Combines rate of change over the last 10 ticks with how many of those
//! ticks actually moved up:
//!
//! ```text
//! roc%  = (p_now - p[-11]) / p[-11] * 100
//! score = up_ticks / 10 * 100
//! ```
//!
//! A large ROC needs broad participation (>= 7 up ticks for a strong buy,
//! <= 3 for a strong sell) before it is called; a moderate ROC needs a
//! weaker majority.

use super::{Signal, Strategy, clamp_strength};

const PERIOD: usize = 10;
const MIN_SAMPLES: usize = 14;

const STRONG_ROC_PCT: f64 = 2.0;
const MODERATE_ROC_PCT: f64 = 0.5;

#[derive(Clone, Copy, Debug, Default)]
pub struct Momentum;

impl Strategy for Momentum {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn min_samples(&self) -> usize {
        MIN_SAMPLES
    }

    fn evaluate(&self, prices: &[f64]) -> Signal {
        let len = prices.len();
        let p_now = prices[len - 1];
        let p_ref = prices[len - PERIOD - 1];

        // Non-positive reference prices cannot produce a meaningful ROC.
        let roc = if p_ref > 0.0 {
            (p_now - p_ref) / p_ref * 100.0
        } else {
            0.0
        };

        let (ups, downs) = prices[len - PERIOD - 1..]
            .windows(2)
            .fold((0usize, 0usize), |(up, down), w| {
                if w[1] > w[0] {
                    (up + 1, down)
                } else if w[1] < w[0] {
                    (up, down + 1)
                } else {
                    (up, down)
                }
            });

        let score = ups as f64 / PERIOD as f64 * 100.0;

        if roc > STRONG_ROC_PCT && score >= 70.0 {
            Signal::buy(
                clamp_strength(score),
                format!("Strong uptrend: {roc:.1}% ROC, {ups}/{PERIOD} ticks up"),
            )
        } else if roc < -STRONG_ROC_PCT && score <= 30.0 {
            Signal::sell(
                clamp_strength(100.0 - score),
                format!("Strong downtrend: {roc:.1}% ROC, {downs}/{PERIOD} ticks down"),
            )
        } else if roc > MODERATE_ROC_PCT && score >= 60.0 {
            Signal::buy(
                clamp_strength(score),
                format!("Moderate uptrend: {roc:.1}% ROC"),
            )
        } else if roc < -MODERATE_ROC_PCT && score <= 40.0 {
            Signal::sell(
                clamp_strength(100.0 - score),
                format!("Moderate downtrend: {roc:.1}% ROC"),
            )
        } else {
            Signal::neutral(
                50,
                format!("Mixed signals: {roc:.1}% ROC, {ups}/{PERIOD} up"),
            )
        }
    }
}
