//! Exponential Moving Average (EMA) indicator.

use crate::services::signals::{closes, mask_warmup, Oscillator};
use crate::types::Bar;

/// Recursive exponential smoothing seeded by the first value.
///
/// `out[0] = values[0]`, `out[i] = alpha * values[i] + (1 - alpha) * out[i-1]`.
/// No lookback-window average is used for the seed.
pub fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut iter = values.iter();

    let Some(&first) = iter.next() else {
        return out;
    };
    out.push(first);

    let mut prev = first;
    for &value in iter {
        prev = alpha * value + (1.0 - alpha) * prev;
        out.push(prev);
    }

    out
}

/// EMA with smoothing factor `2 / (span + 1)`.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    ewm(values, 2.0 / (span as f64 + 1.0))
}

/// Wilder's smoothing, i.e. EMA with smoothing factor `1 / period`.
pub fn wilder_series(values: &[f64], period: usize) -> Vec<f64> {
    ewm(values, 1.0 / period.max(1) as f64)
}

/// EMA (Exponential Moving Average) of the close.
///
/// Used as the optional long-period trend gate: price above the EMA allows
/// LONG entries, price below allows SHORT entries.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Oscillator for Ema {
    fn id(&self) -> &str {
        "ema"
    }

    fn name(&self) -> String {
        format!("EMA ({})", self.period)
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn series(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        mask_warmup(ema_series(&closes(bars), self.period), self.min_periods())
    }
}
