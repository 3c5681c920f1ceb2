//! Heikin-Ashi transform.

use crate::error::SignalError;
use crate::types::{Bar, SyntheticCandle};
use serde::{Deserialize, Serialize};

/// How the synthetic open of the first bar is seeded.
///
/// Only bar 0 differs between the two; the recursion makes the difference
/// halve on every following bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaSeed {
    /// `(open[0] + close[0]) / 2`
    #[default]
    Midpoint,
    /// `open[0]`
    RawOpen,
}

impl HaSeed {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "midpoint" | "mid" | "average" => Some(Self::Midpoint),
            "raw_open" | "open" | "raw" => Some(Self::RawOpen),
            _ => None,
        }
    }
}

/// Convert raw bars into Heikin-Ashi candles, same length as the input.
///
/// - close[i] = (open + high + low + close) / 4
/// - open[0] from `seed`
/// - open[i] = (open[i-1] + close[i-1]) / 2
pub fn compute_synthetic(bars: &[Bar], seed: HaSeed) -> Result<Vec<SyntheticCandle>, SignalError> {
    if bars.len() < 2 {
        return Err(SignalError::InsufficientData {
            required: 2,
            got: bars.len(),
        });
    }

    let mut candles: Vec<SyntheticCandle> = Vec::with_capacity(bars.len());
    for bar in bars {
        let close = (bar.open + bar.high + bar.low + bar.close) / 4.0;
        let open = match candles.last() {
            Some(prev) => (prev.open + prev.close) / 2.0,
            None => match seed {
                HaSeed::Midpoint => (bar.open + bar.close) / 2.0,
                HaSeed::RawOpen => bar.open,
            },
        };
        candles.push(SyntheticCandle::new(open, close));
    }

    Ok(candles)
}
