use crate::types::Timeframe;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Colour of a Heikin-Ashi candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleColor {
    Up,
    Down,
}

impl fmt::Display for CandleColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandleColor::Up => write!(f, "up"),
            CandleColor::Down => write!(f, "down"),
        }
    }
}

/// Heikin-Ashi candle derived from a bar and the previous synthetic candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticCandle {
    pub open: f64,
    pub close: f64,
    pub color: CandleColor,
}

impl SyntheticCandle {
    /// Build a candle, deriving its colour. A doji (close == open) is Down.
    pub fn new(open: f64, close: f64) -> Self {
        let color = if close > open {
            CandleColor::Up
        } else {
            CandleColor::Down
        };
        Self { open, close, color }
    }
}

/// Per-bar oscillator values consumed by the state machine.
///
/// `None` marks an index inside the warm-up window (or a gate that is not
/// enabled).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OscillatorReading {
    /// MACD histogram (MACD line minus signal line).
    pub histogram: Option<f64>,
    /// Wilder ADX, 0-100.
    pub adx: Option<f64>,
    /// Long-period trend EMA of the close.
    pub trend_ema: Option<f64>,
}

/// Position label of one (symbol, timeframe) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    #[default]
    Flat,
    Long,
    Short,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Flat => write!(f, "FLAT"),
            Position::Long => write!(f, "LONG"),
            Position::Short => write!(f, "SHORT"),
        }
    }
}

/// Evolving position state during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalState {
    pub position: Position,
    pub entry_price: Option<f64>,
    pub entry_time: Option<i64>,
}

impl SignalState {
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn enter(position: Position, price: f64, time: i64) -> Self {
        Self {
            position,
            entry_price: Some(price),
            entry_time: Some(time),
        }
    }

    /// Whether a LONG or SHORT position is held.
    pub fn is_active(&self) -> bool {
        self.position != Position::Flat
    }
}

/// A single state change recorded by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// Bar index the transition happened on.
    pub index: usize,
    pub time: i64,
    /// Close of the bar the transition happened on.
    pub price: f64,
    pub from: Position,
    pub to: Position,
}

/// Result of one full pass of the state machine over a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOutcome {
    pub state: SignalState,
    /// Most recent transition, `None` if nothing ever fired.
    pub last_transition: Option<Transition>,
    /// Colour of the final synthetic candle.
    pub last_color: CandleColor,
    /// Number of transitions in the pass.
    pub transitions: usize,
}

impl RunOutcome {
    pub fn flip_time(&self) -> Option<i64> {
        self.last_transition.map(|t| t.time)
    }

    pub fn flip_price(&self) -> Option<f64> {
        self.last_transition.map(|t| t.price)
    }
}

/// State shown to a reader of a report.
///
/// `WeakBias` is used when no transition ever fired: the record then only
/// carries the colour of the latest candle, which is not an entry signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportedState {
    Long,
    Short,
    Flat,
    WeakBias,
}

impl ReportedState {
    /// Derive the reported state from a run.
    pub fn from_outcome(outcome: &RunOutcome, report_weak_bias: bool) -> Self {
        match outcome.state.position {
            Position::Long => ReportedState::Long,
            Position::Short => ReportedState::Short,
            Position::Flat if outcome.last_transition.is_none() && report_weak_bias => {
                ReportedState::WeakBias
            }
            Position::Flat => ReportedState::Flat,
        }
    }

    /// Whether this state reflects an open position.
    pub fn is_active(&self) -> bool {
        matches!(self, ReportedState::Long | ReportedState::Short)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportedState::Long => "LONG",
            ReportedState::Short => "SHORT",
            ReportedState::Flat => "FLAT",
            ReportedState::WeakBias => "WEAK_BIAS",
        }
    }
}

impl fmt::Display for ReportedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Secondary indicator values at the last bar, used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    /// Bollinger bandwidth, (upper - lower) / middle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f64>,
    /// Bandwidth at its lowest over the squeeze lookback.
    pub squeeze: bool,
}

/// Output unit of the aggregator: one (symbol, timeframe) signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRecord {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub state: ReportedState,
    /// Colour of the latest synthetic candle.
    pub color: CandleColor,
    pub entry_price: Option<f64>,
    pub entry_time: Option<i64>,
    pub flip_time: Option<i64>,
    pub flip_price: Option<f64>,
    /// Flip happened inside the freshness window at the end of the series.
    pub is_new: bool,
    pub last_close: f64,
    /// Unrealised move since entry in percent, signed by side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl_pct: Option<f64>,
    pub indicators: IndicatorSnapshot,
}

impl SignalRecord {
    pub fn is_bullish(&self) -> bool {
        match self.state {
            ReportedState::Long => true,
            ReportedState::WeakBias => self.color == CandleColor::Up,
            _ => false,
        }
    }

    pub fn is_bearish(&self) -> bool {
        match self.state {
            ReportedState::Short => true,
            ReportedState::WeakBias => self.color == CandleColor::Down,
            _ => false,
        }
    }
}

/// All records of one symbol, ordered by timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub symbol: String,
    pub records: Vec<SignalRecord>,
    /// Candle colours differ from the previous run's snapshot.
    #[serde(default)]
    pub changed: bool,
}

impl ReportEntry {
    pub fn has_new(&self) -> bool {
        self.records.iter().any(|r| r.is_new)
    }
}
