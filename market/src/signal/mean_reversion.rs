//! Mean Reversion
//!
//! Flags prices that have strayed further from their 20-sample average than
//! recent volatility would explain:
//!
//! ```text
//! deviation% = (p_now - sma) / sma * 100
//! threshold% = 1.5 * (stddev / sma * 100)
//! ```
//!
//! Below `-threshold` the market is treated as oversold (BUY), above
//! `+threshold` as overbought (SELL). Strength grows linearly with
//! `|deviation / threshold|`.
//!
//! A perfectly flat window has `stddev == 0` and therefore a zero threshold:
//! any deviation at all is then flagged at full strength.

use super::{Signal, Strategy, clamp_strength};

const PERIOD: usize = 20;
const STDDEV_MULTIPLIER: f64 = 1.5;

#[derive(Clone, Copy, Debug, Default)]
pub struct MeanReversion;

impl Strategy for MeanReversion {
    fn name(&self) -> &'static str {
        "mean_reversion"
    }

    fn min_samples(&self) -> usize {
        PERIOD
    }

    fn evaluate(&self, prices: &[f64]) -> Signal {
        let window = &prices[prices.len() - PERIOD..];
        let p_now = window[PERIOD - 1];

        let sma = window.iter().sum::<f64>() / PERIOD as f64;
        if sma == 0.0 {
            return Signal::neutral(50, "Flat zero average");
        }

        let variance = window.iter().map(|p| (p - sma).powi(2)).sum::<f64>() / PERIOD as f64;
        let stddev_pct = variance.sqrt() / sma * 100.0;
        let threshold = stddev_pct * STDDEV_MULTIPLIER;

        let deviation = (p_now - sma) / sma * 100.0;

        if deviation < -threshold {
            Signal::buy(
                clamp_strength((deviation / threshold).abs() * 100.0),
                format!("Price {:.2}% below SMA (oversold)", deviation.abs()),
            )
        } else if deviation > threshold {
            Signal::sell(
                clamp_strength((deviation / threshold).abs() * 100.0),
                format!("Price {deviation:.2}% above SMA (overbought)"),
            )
        } else {
            Signal::neutral(50, format!("Price near SMA ({deviation:.2}% deviation)"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Direction;

    #[test]
    fn needs_twenty_samples() {
        let s = MeanReversion.analyze(&[100.0; 19]);

        assert_eq!(s.direction, Direction::Neutral);
        assert_eq!(s.strength, 0);
    }

    #[test]
    fn flat_window_is_neutral() {
        let s = MeanReversion.analyze(&[100.0; 30]);

        assert_eq!(s.direction, Direction::Neutral);
        assert_eq!(s.strength, 50);
        assert_eq!(s.reason, "Price near SMA (0.00% deviation)");
    }

    #[test]
    fn sharp_drop_after_flat_run_is_oversold() {
        let mut prices = vec![100.0; 25];
        prices.push(95.0);

        let s = MeanReversion.analyze(&prices);

        // sma = 99.75, deviation = -4.76%, threshold = 1.64% -> capped at 100
        assert_eq!(s.direction, Direction::Buy);
        assert_eq!(s.strength, 100);
        assert_eq!(s.reason, "Price 4.76% below SMA (oversold)");
    }

    #[test]
    fn sharp_spike_is_overbought() {
        let mut prices = vec![100.0; 19];
        prices.push(110.0);

        let s = MeanReversion.analyze(&prices);

        assert_eq!(s.direction, Direction::Sell);
        assert_eq!(s.strength, 100);
    }

    #[test]
    fn noise_inside_band_is_neutral() {
        // Alternating 99/101 with the last tick at the mean-ish level.
        let mut prices: Vec<f64> = (0..19)
            .map(|i| if i % 2 == 0 { 99.0 } else { 101.0 })
            .collect();
        prices.push(100.5);

        let s = MeanReversion.analyze(&prices);

        assert_eq!(s.direction, Direction::Neutral);
        assert_eq!(s.strength, 50);
    }

    #[test]
    fn only_last_twenty_samples_count() {
        // An old crash outside the window must not move the average.
        let mut prices = vec![1.0; 10];
        prices.extend(std::iter::repeat_n(100.0, 20));

        let s = MeanReversion.analyze(&prices);

        assert_eq!(s.direction, Direction::Neutral);
    }

    #[test]
    fn zero_average_is_handled() {
        let s = MeanReversion.analyze(&[0.0; 20]);

        assert_eq!(s.direction, Direction::Neutral);
        assert_eq!(s.reason, "Flat zero average");
    }
}
