//! Heikin-Ashi / MACD-histogram state machine.
//!
//! Rules evaluated on every bar `i >= 1`:
//! - Exit: LONG exits when the histogram falls, SHORT exits when it rises.
//!   A step that exits never re-enters.
//! - Entry (FLAT only): LONG on an Up candle with a rising histogram below
//!   zero, SHORT on a Down candle with a falling histogram above zero.
//!   Optional ADX and trend-EMA gates are ANDed onto the entry.
//!
//! Indices whose histogram (or an enabled gate) is still inside the
//! warm-up window are skipped without touching the state.

use super::heikin_ashi::{compute_synthetic, HaSeed};
use super::indicators::{Adx, Ema, Macd};
use super::Oscillator;
use crate::error::SignalError;
use crate::types::{
    validate_series, Bar, CandleColor, OscillatorReading, Position, RunOutcome, SignalState,
    SyntheticCandle, Transition,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// ADX entry gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxGate {
    pub period: usize,
    /// Entries need ADX strictly above this.
    pub threshold: f64,
}

/// Engine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub ha_seed: HaSeed,
    /// LONG needs histogram < 0 and SHORT needs histogram > 0.
    pub require_zero_line: bool,
    pub adx_gate: Option<AdxGate>,
    /// LONG needs close above this EMA, SHORT needs close below.
    pub trend_ema_period: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            ha_seed: HaSeed::Midpoint,
            require_zero_line: true,
            adx_gate: None,
            trend_ema_period: None,
        }
    }
}

impl EngineConfig {
    pub fn with_macd(mut self, fast: usize, slow: usize, signal: usize) -> Self {
        self.macd_fast = fast;
        self.macd_slow = slow;
        self.macd_signal = signal;
        self
    }

    pub fn with_ha_seed(mut self, seed: HaSeed) -> Self {
        self.ha_seed = seed;
        self
    }

    pub fn with_zero_line(mut self, required: bool) -> Self {
        self.require_zero_line = required;
        self
    }

    pub fn with_adx_gate(mut self, period: usize, threshold: f64) -> Self {
        self.adx_gate = Some(AdxGate { period, threshold });
        self
    }

    pub fn with_trend_ema(mut self, period: usize) -> Self {
        self.trend_ema_period = Some(period);
        self
    }

    pub fn macd(&self) -> Macd {
        Macd::new(self.macd_fast, self.macd_slow, self.macd_signal)
    }

    /// Minimum series length for every enabled oscillator to leave warm-up.
    pub fn min_bars(&self) -> usize {
        let mut required = self.macd().min_periods().max(2);
        if let Some(gate) = self.adx_gate {
            required = required.max(Adx::new(gate.period).min_periods());
        }
        if let Some(period) = self.trend_ema_period {
            required = required.max(Ema::new(period).min_periods());
        }
        required
    }

    pub fn entry_rules(&self) -> EntryRules {
        EntryRules {
            require_zero_line: self.require_zero_line,
            adx_threshold: self.adx_gate.map(|g| g.threshold),
            use_trend_ema: self.trend_ema_period.is_some(),
        }
    }
}

/// The subset of the config the state machine itself needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryRules {
    pub require_zero_line: bool,
    pub adx_threshold: Option<f64>,
    pub use_trend_ema: bool,
}

impl Default for EntryRules {
    fn default() -> Self {
        EngineConfig::default().entry_rules()
    }
}

impl EntryRules {
    /// Whether the enabled gates allow a `side` entry at this bar.
    ///
    /// An enabled gate with an undefined value blocks the entry.
    fn gates_allow(&self, side: Position, close: f64, reading: &OscillatorReading) -> bool {
        if let Some(threshold) = self.adx_threshold {
            match reading.adx {
                Some(adx) if adx > threshold => {}
                _ => return false,
            }
        }

        if self.use_trend_ema {
            match (side, reading.trend_ema) {
                (Position::Long, Some(ema)) if close > ema => {}
                (Position::Short, Some(ema)) if close < ema => {}
                _ => return false,
            }
        }

        true
    }
}

fn histogram_pair(readings: &[OscillatorReading], index: usize) -> Result<(f64, f64), SignalError> {
    match (readings[index - 1].histogram, readings[index].histogram) {
        (Some(prev), Some(current)) => Ok((prev, current)),
        _ => Err(SignalError::UndefinedOscillatorValue { index }),
    }
}

/// Single forward pass over a series, starting FLAT.
///
/// The three inputs must be aligned bar for bar; only the common prefix is
/// scanned.
pub fn run_state_machine(
    bars: &[Bar],
    candles: &[SyntheticCandle],
    readings: &[OscillatorReading],
    rules: &EntryRules,
) -> Result<RunOutcome, SignalError> {
    let len = bars.len().min(candles.len()).min(readings.len());
    if len < 2 {
        return Err(SignalError::InsufficientData {
            required: 2,
            got: len,
        });
    }

    let mut state = SignalState::flat();
    let mut last_transition: Option<Transition> = None;
    let mut transitions = 0usize;

    for i in 1..len {
        let (prev, hist) = match histogram_pair(readings, i) {
            Ok(pair) => pair,
            Err(e) => {
                trace!("skipping bar: {}", e);
                continue;
            }
        };
        let bar = &bars[i];

        let exit = match state.position {
            Position::Long => hist < prev,
            Position::Short => hist > prev,
            Position::Flat => false,
        };

        if exit {
            let transition = Transition {
                index: i,
                time: bar.time,
                price: bar.close,
                from: state.position,
                to: Position::Flat,
            };
            debug!("exit {} at index {} ({})", state.position, i, bar.close);
            state = SignalState::flat();
            last_transition = Some(transition);
            transitions += 1;
            continue;
        }

        if state.is_active() {
            continue;
        }

        let color = candles[i].color;
        let entry = if color == CandleColor::Up
            && hist > prev
            && (!rules.require_zero_line || hist < 0.0)
        {
            Some(Position::Long)
        } else if color == CandleColor::Down
            && hist < prev
            && (!rules.require_zero_line || hist > 0.0)
        {
            Some(Position::Short)
        } else {
            None
        };

        if let Some(side) = entry {
            if !rules.gates_allow(side, bar.close, &readings[i]) {
                continue;
            }

            debug!("enter {} at index {} ({})", side, i, bar.close);
            state = SignalState::enter(side, bar.close, bar.time);
            last_transition = Some(Transition {
                index: i,
                time: bar.time,
                price: bar.close,
                from: Position::Flat,
                to: side,
            });
            transitions += 1;
        }
    }

    Ok(RunOutcome {
        state,
        last_transition,
        last_color: candles[len - 1].color,
        transitions,
    })
}

/// Engine bundling the Heikin-Ashi transform, the oscillator bank and the
/// state machine behind one entry point.
#[derive(Debug, Clone)]
pub struct TrendFlipEngine {
    config: EngineConfig,
    macd: Macd,
    adx: Option<Adx>,
    trend_ema: Option<Ema>,
}

impl Default for TrendFlipEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TrendFlipEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            macd: config.macd(),
            adx: config.adx_gate.map(|g| Adx::new(g.period)),
            trend_ema: config.trend_ema_period.map(Ema::new),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Oscillator bank output, aligned with `bars`.
    pub fn readings(&self, bars: &[Bar]) -> Vec<OscillatorReading> {
        let histogram = self.macd.series(bars);
        let adx = self.adx.as_ref().map(|a| a.series(bars));
        let trend_ema = self.trend_ema.as_ref().map(|e| e.series(bars));

        histogram
            .into_iter()
            .enumerate()
            .map(|(i, histogram)| OscillatorReading {
                histogram,
                adx: adx.as_ref().and_then(|s| s[i]),
                trend_ema: trend_ema.as_ref().and_then(|s| s[i]),
            })
            .collect()
    }

    /// Validate a series and run the full pipeline over it.
    pub fn run(&self, bars: &[Bar]) -> Result<RunOutcome, SignalError> {
        validate_series(bars)?;

        let required = self.config.min_bars();
        if bars.len() < required {
            return Err(SignalError::InsufficientData {
                required,
                got: bars.len(),
            });
        }

        let candles = compute_synthetic(bars, self.config.ha_seed)?;
        let readings = self.readings(bars);
        run_state_machine(bars, &candles, &readings, &self.config.entry_rules())
    }
}
