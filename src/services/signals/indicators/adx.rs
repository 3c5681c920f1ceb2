//! Average Directional Index (ADX) indicator.

use super::ema::wilder_series;
use crate::services::signals::{mask_warmup, Oscillator};
use crate::types::Bar;

/// Raw directional lines, one value per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct AdxLines {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub adx: Vec<f64>,
}

/// ADX (Average Directional Index) indicator.
///
/// Measures trend strength (not direction):
/// - Below 20: Weak trend / ranging market
/// - 20-40: Trending
/// - Above 40: Strong trend
///
/// TR, +DM and -DM are Wilder-smoothed (alpha = 1/period); the first bar
/// has no previous close, so its TR is just high - low and both DMs are 0.
#[derive(Debug, Clone, Copy)]
pub struct Adx {
    period: usize,
}

impl Default for Adx {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Adx {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Calculate True Range.
    fn true_range(current: &Bar, previous: &Bar) -> f64 {
        let hl = current.high - current.low;
        let hc = (current.high - previous.close).abs();
        let lc = (current.low - previous.close).abs();
        hl.max(hc).max(lc)
    }

    /// Calculate +DI, -DI and ADX for every bar.
    pub fn lines(&self, bars: &[Bar]) -> AdxLines {
        let mut plus_dm = Vec::with_capacity(bars.len());
        let mut minus_dm = Vec::with_capacity(bars.len());
        let mut tr = Vec::with_capacity(bars.len());

        for (i, current) in bars.iter().enumerate() {
            if i == 0 {
                plus_dm.push(0.0);
                minus_dm.push(0.0);
                tr.push(current.high - current.low);
                continue;
            }
            let previous = &bars[i - 1];

            let up_move = current.high - previous.high;
            let down_move = previous.low - current.low;

            plus_dm.push(if up_move > down_move && up_move > 0.0 {
                up_move
            } else {
                0.0
            });
            minus_dm.push(if down_move > up_move && down_move > 0.0 {
                down_move
            } else {
                0.0
            });

            tr.push(Self::true_range(current, previous));
        }

        let smoothed_tr = wilder_series(&tr, self.period);
        let smoothed_plus = wilder_series(&plus_dm, self.period);
        let smoothed_minus = wilder_series(&minus_dm, self.period);

        let mut plus_di = Vec::with_capacity(bars.len());
        let mut minus_di = Vec::with_capacity(bars.len());
        let mut dx = Vec::with_capacity(bars.len());

        for i in 0..smoothed_tr.len() {
            // A zero range would turn every DI into NaN.
            let atr = if smoothed_tr[i] == 0.0 {
                1.0
            } else {
                smoothed_tr[i]
            };

            let pdi = 100.0 * smoothed_plus[i] / atr;
            let mdi = 100.0 * smoothed_minus[i] / atr;
            let di_sum = pdi + mdi;

            plus_di.push(pdi);
            minus_di.push(mdi);
            dx.push(if di_sum > 0.0 {
                100.0 * (pdi - mdi).abs() / di_sum
            } else {
                0.0
            });
        }

        let adx = wilder_series(&dx, self.period);

        AdxLines {
            plus_di,
            minus_di,
            adx,
        }
    }
}

impl Oscillator for Adx {
    fn id(&self) -> &str {
        "adx"
    }

    fn name(&self) -> String {
        format!("ADX ({})", self.period)
    }

    fn min_periods(&self) -> usize {
        self.period * 2
    }

    fn series(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        mask_warmup(self.lines(bars).adx, self.min_periods())
    }
}
