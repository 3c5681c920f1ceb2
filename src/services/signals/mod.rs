//! Trend-flip signal engine.
//!
//! Heikin-Ashi candles and an oscillator bank are computed over the same bar
//! series, a state machine walks both bar by bar, and the aggregator turns
//! the final states into ordered report records.

pub mod aggregator;
pub mod engine;
pub mod heikin_ashi;
pub mod indicators;

pub use aggregator::{group_by_symbol, sort_records, AggregatorConfig, SignalAggregator};
pub use engine::{run_state_machine, EngineConfig, EntryRules, TrendFlipEngine};
pub use heikin_ashi::{compute_synthetic, HaSeed};

use crate::types::Bar;

/// Trait for per-bar oscillators.
pub trait Oscillator: Send + Sync {
    /// Unique identifier for this oscillator.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> String;

    /// Number of bars needed before a value is considered valid.
    fn min_periods(&self) -> usize;

    /// Compute one value per bar. Entries inside the warm-up window are `None`.
    fn series(&self, bars: &[Bar]) -> Vec<Option<f64>>;

    /// Value at the last bar, if it is out of the warm-up window.
    fn latest(&self, bars: &[Bar]) -> Option<f64> {
        self.series(bars).last().copied().flatten()
    }
}

/// Hide values that fall inside the warm-up window.
pub fn mask_warmup(values: Vec<f64>, min_periods: usize) -> Vec<Option<f64>> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            if i + 1 >= min_periods && v.is_finite() {
                Some(v)
            } else {
                None
            }
        })
        .collect()
}

/// Closing prices of a series.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
