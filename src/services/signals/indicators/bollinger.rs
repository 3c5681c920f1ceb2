//! Bollinger Bands indicator.

use crate::services::signals::{closes, mask_warmup, Oscillator};
use crate::types::Bar;

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// The series is the bandwidth `(upper - lower) / middle`. A squeeze is
/// flagged when the latest bandwidth is the lowest of the last
/// `squeeze_lookback` defined values.
#[derive(Debug, Clone, Copy)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
    squeeze_lookback: usize,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
            squeeze_lookback: 50,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64, squeeze_lookback: usize) -> Self {
        Self {
            period: period.max(1),
            std_dev_multiplier,
            squeeze_lookback: squeeze_lookback.max(1),
        }
    }

    /// Calculate standard deviation.
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let variance: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    fn bandwidths(&self, values: &[f64]) -> Vec<f64> {
        let mut out = vec![f64::NAN; values.len()];
        if values.len() < self.period {
            return out;
        }

        for end in self.period..=values.len() {
            let window = &values[end - self.period..end];
            let middle = window.iter().sum::<f64>() / self.period as f64;
            let std_dev = Self::std_dev(window, middle);
            if middle > 0.0 {
                out[end - 1] = 2.0 * self.std_dev_multiplier * std_dev / middle;
            }
        }
        out
    }

    /// Whether the latest bandwidth is at its lowest over the lookback.
    pub fn is_squeeze(&self, bars: &[Bar]) -> bool {
        let defined: Vec<f64> = self.series(bars).into_iter().flatten().collect();
        if defined.len() < self.squeeze_lookback {
            return false;
        }

        let window = &defined[defined.len() - self.squeeze_lookback..];
        let latest = window[window.len() - 1];
        window.iter().all(|&bw| latest <= bw)
    }
}

impl Oscillator for BollingerBands {
    fn id(&self) -> &str {
        "bollinger"
    }

    fn name(&self) -> String {
        format!("Bollinger Bands ({}, {})", self.period, self.std_dev_multiplier)
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn series(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        mask_warmup(self.bandwidths(&closes(bars)), self.min_periods())
    }
}
