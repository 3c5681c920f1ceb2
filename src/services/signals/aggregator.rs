//! Signal aggregation.
//!
//! Turns per-pair run outcomes into `SignalRecord`s, filters them, and
//! orders them for display: fresh flips first, then open positions, then the
//! most recent flip time.

use super::indicators::{Adx, BollingerBands, Rsi};
use super::Oscillator;
use crate::types::{
    Bar, IndicatorSnapshot, Position, ReportEntry, ReportedState, RunOutcome, SignalRecord,
    Timeframe,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Aggregator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// A flip inside the last `fresh_bars` bars is marked new.
    pub fresh_bars: usize,
    /// Drop FLAT and WEAK_BIAS records.
    pub only_active: bool,
    /// Drop records whose ADX is defined and below this.
    pub min_adx: Option<f64>,
    /// Report the latest candle colour when nothing ever fired.
    pub report_weak_bias: bool,
    pub adx_period: usize,
    pub rsi_period: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            fresh_bars: 2,
            only_active: false,
            min_adx: None,
            report_weak_bias: true,
            adx_period: 14,
            rsi_period: 14,
        }
    }
}

/// Builds, filters and orders signal records.
#[derive(Debug, Clone)]
pub struct SignalAggregator {
    config: AggregatorConfig,
    adx: Adx,
    rsi: Rsi,
    bollinger: BollingerBands,
}

impl Default for SignalAggregator {
    fn default() -> Self {
        Self::new(AggregatorConfig::default())
    }
}

impl SignalAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            adx: Adx::new(config.adx_period),
            rsi: Rsi::new(config.rsi_period),
            bollinger: BollingerBands::default(),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Whether a flip at `flip_time` falls inside the freshness window.
    ///
    /// The window starts at the open time of bar `len - fresh_bars`, so with
    /// the default of 2 a flip on the last or second-to-last bar is new. The
    /// extra bar tolerates a feed whose last bar is still forming.
    pub fn is_new(&self, bars: &[Bar], flip_time: Option<i64>) -> bool {
        let (Some(flip_time), false) = (flip_time, bars.is_empty()) else {
            return false;
        };

        let fresh = self.config.fresh_bars.clamp(1, bars.len());
        flip_time >= bars[bars.len() - fresh].time
    }

    /// Secondary indicators at the last bar.
    pub fn snapshot(&self, bars: &[Bar]) -> IndicatorSnapshot {
        IndicatorSnapshot {
            adx: self.adx.latest(bars),
            rsi: self.rsi.latest(bars),
            bandwidth: self.bollinger.latest(bars),
            squeeze: self.bollinger.is_squeeze(bars),
        }
    }

    /// Build the record for one (symbol, timeframe) run.
    pub fn record(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bars: &[Bar],
        outcome: &RunOutcome,
    ) -> SignalRecord {
        let last_close = bars.last().map(|b| b.close).unwrap_or_default();
        let state = ReportedState::from_outcome(outcome, self.config.report_weak_bias);

        let pnl_pct = match (outcome.state.position, outcome.state.entry_price) {
            (Position::Long, Some(entry)) if entry > 0.0 => {
                Some((last_close - entry) / entry * 100.0)
            }
            (Position::Short, Some(entry)) if entry > 0.0 => {
                Some((entry - last_close) / entry * 100.0)
            }
            _ => None,
        };

        SignalRecord {
            symbol: symbol.to_string(),
            timeframe,
            state,
            color: outcome.last_color,
            entry_price: outcome.state.entry_price,
            entry_time: outcome.state.entry_time,
            flip_time: outcome.flip_time(),
            flip_price: outcome.flip_price(),
            is_new: self.is_new(bars, outcome.flip_time()),
            last_close,
            pnl_pct,
            indicators: self.snapshot(bars),
        }
    }

    /// Whether a record passes the configured filters.
    pub fn keep(&self, record: &SignalRecord) -> bool {
        if self.config.only_active && !record.state.is_active() {
            return false;
        }

        match (self.config.min_adx, record.indicators.adx) {
            (Some(min), Some(adx)) => adx >= min,
            _ => true,
        }
    }

    /// Filter and order a batch of records.
    pub fn aggregate(&self, records: Vec<SignalRecord>) -> Vec<SignalRecord> {
        let mut kept: Vec<SignalRecord> = records.into_iter().filter(|r| self.keep(r)).collect();
        sort_records(&mut kept);
        kept
    }
}

/// Display order of two records.
///
/// New flips first, then open positions, then the latest flip time (records
/// without a flip last), then symbol and timeframe ascending.
pub fn compare_records(a: &SignalRecord, b: &SignalRecord) -> Ordering {
    b.is_new
        .cmp(&a.is_new)
        .then_with(|| b.state.is_active().cmp(&a.state.is_active()))
        .then_with(|| b.flip_time.cmp(&a.flip_time))
        .then_with(|| a.symbol.cmp(&b.symbol))
        .then_with(|| a.timeframe.cmp(&b.timeframe))
}

pub fn sort_records(records: &mut [SignalRecord]) {
    records.sort_by(compare_records);
}

/// Group records by symbol.
///
/// Symbols keep the order of their first record; records inside an entry
/// are ordered by timeframe.
pub fn group_by_symbol(records: &[SignalRecord]) -> Vec<ReportEntry> {
    let mut entries: Vec<ReportEntry> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let idx = *positions.entry(record.symbol.as_str()).or_insert_with(|| {
            entries.push(ReportEntry {
                symbol: record.symbol.clone(),
                records: Vec::new(),
                changed: false,
            });
            entries.len() - 1
        });
        entries[idx].records.push(record.clone());
    }

    for entry in &mut entries {
        entry.records.sort_by_key(|r| r.timeframe);
    }

    entries
}
