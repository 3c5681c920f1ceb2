//! Relative Strength Index (RSI) indicator.

use super::ema::wilder_series;
use crate::services::signals::{closes, mask_warmup, Oscillator};
use crate::types::Bar;

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
///
/// Reported next to each signal; it never drives a transition.
#[derive(Debug, Clone, Copy)]
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    /// RSI for every bar; index 0 has no price change and is NaN.
    fn raw(&self, values: &[f64]) -> Vec<f64> {
        if values.len() < 2 {
            return vec![f64::NAN; values.len()];
        }

        let mut gains = Vec::with_capacity(values.len() - 1);
        let mut losses = Vec::with_capacity(values.len() - 1);
        for pair in values.windows(2) {
            let change = pair[1] - pair[0];
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        let avg_gain = wilder_series(&gains, self.period);
        let avg_loss = wilder_series(&losses, self.period);

        let mut out = Vec::with_capacity(values.len());
        out.push(f64::NAN);
        for (gain, loss) in avg_gain.iter().zip(avg_loss.iter()) {
            let rsi = if *loss == 0.0 {
                if *gain == 0.0 {
                    50.0
                } else {
                    100.0
                }
            } else {
                100.0 - 100.0 / (1.0 + gain / loss)
            };
            out.push(rsi);
        }
        out
    }
}

impl Oscillator for Rsi {
    fn id(&self) -> &str {
        "rsi"
    }

    fn name(&self) -> String {
        format!("RSI ({})", self.period)
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn series(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        mask_warmup(self.raw(&closes(bars)), self.min_periods())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_uptrend_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64 * 1.5;
                Bar::new(1_000_000 + i as i64 * 60_000, base, base + 2.0, base - 1.0, base + 1.0, 1000.0)
            })
            .collect()
    }

    fn create_downtrend_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let base = 200.0 - i as f64 * 1.5;
                Bar::new(1_000_000 + i as i64 * 60_000, base, base + 1.0, base - 2.0, base - 1.0, 1000.0)
            })
            .collect()
    }

    #[test]
    fn test_rsi_id_and_name() {
        let rsi = Rsi::default();
        assert_eq!(rsi.id(), "rsi");
        assert_eq!(rsi.name(), "RSI (14)");
    }

    #[test]
    fn test_rsi_min_periods() {
        assert_eq!(Rsi::default().min_periods(), 15);
        assert_eq!(Rsi::new(7).min_periods(), 8);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(Rsi::default().latest(&create_uptrend_bars(10)).is_none());
    }

    #[test]
    fn test_rsi_uptrend_high_value() {
        let value = Rsi::default().latest(&create_uptrend_bars(50)).unwrap();
        assert!(value > 50.0, "RSI in uptrend should be > 50, got {}", value);
    }

    #[test]
    fn test_rsi_downtrend_low_value() {
        let value = Rsi::default().latest(&create_downtrend_bars(50)).unwrap();
        assert!(value < 50.0, "RSI in downtrend should be < 50, got {}", value);
    }

    #[test]
    fn test_rsi_value_range() {
        for v in Rsi::default().series(&create_downtrend_bars(50)).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn test_rsi_flat_prices_neutral() {
        let bars: Vec<Bar> = (0..30)
            .map(|i| Bar::new(i * 60_000, 50.0, 50.0, 50.0, 50.0, 0.0))
            .collect();
        assert_eq!(Rsi::default().latest(&bars), Some(50.0));
    }

    #[test]
    fn test_rsi_only_gains_is_100() {
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        assert_eq!(Rsi::new(5).raw(&closes).last().copied(), Some(100.0));
    }

    #[test]
    fn test_rsi_single_bar() {
        let bars = create_uptrend_bars(1);
        assert_eq!(Rsi::default().series(&bars), vec![None]);
    }
}
