//! MACD (Moving Average Convergence Divergence) indicator.

use super::ema::ema_series;
use crate::services::signals::{closes, mask_warmup, Oscillator};
use crate::types::Bar;

/// Raw MACD lines, one value per input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// The series produced by [`Oscillator::series`] is the histogram; values
/// before `slow + signal` bars are undefined.
#[derive(Debug, Clone, Copy)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period: fast_period.max(1),
            slow_period: slow_period.max(1),
            signal_period: signal_period.max(1),
        }
    }

    /// Calculate all three lines over a series of values.
    pub fn lines(&self, values: &[f64]) -> MacdLines {
        let fast = ema_series(values, self.fast_period);
        let slow = ema_series(values, self.slow_period);

        let macd: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let signal = ema_series(&macd, self.signal_period);
        let histogram = macd.iter().zip(signal.iter()).map(|(m, s)| m - s).collect();

        MacdLines {
            macd,
            signal,
            histogram,
        }
    }
}

impl Oscillator for Macd {
    fn id(&self) -> &str {
        "macd"
    }

    fn name(&self) -> String {
        format!(
            "MACD ({}, {}, {})",
            self.fast_period, self.slow_period, self.signal_period
        )
    }

    fn min_periods(&self) -> usize {
        self.slow_period + self.signal_period
    }

    fn series(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let lines = self.lines(&closes(bars));
        mask_warmup(lines.histogram, self.min_periods())
    }
}
