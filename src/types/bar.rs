use crate::error::SignalError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One time step of market data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds (bar open time).
    #[serde(alias = "timestamp")]
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check this bar in isolation. Returns a human readable reason on failure.
    fn check(&self) -> Option<String> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Some(format!("{} is not finite ({})", name, value));
            }
            if value <= 0.0 {
                return Some(format!("{} must be positive ({})", name, value));
            }
        }

        if !self.volume.is_finite() || self.volume < 0.0 {
            return Some(format!("volume must be finite and >= 0 ({})", self.volume));
        }

        if self.high < self.open.max(self.close) {
            return Some(format!(
                "high {} below max(open, close) {}",
                self.high,
                self.open.max(self.close)
            ));
        }

        if self.low > self.open.min(self.close) {
            return Some(format!(
                "low {} above min(open, close) {}",
                self.low,
                self.open.min(self.close)
            ));
        }

        None
    }
}

/// Reject a series containing non-finite prices, broken OHLC ranges or
/// timestamps that are not strictly increasing.
pub fn validate_series(bars: &[Bar]) -> Result<(), SignalError> {
    for (index, bar) in bars.iter().enumerate() {
        if let Some(reason) = bar.check() {
            return Err(SignalError::MalformedBar { index, reason });
        }

        if index > 0 && bar.time <= bars[index - 1].time {
            return Err(SignalError::MalformedBar {
                index,
                reason: format!(
                    "timestamp {} not after previous {}",
                    bar.time,
                    bars[index - 1].time
                ),
            });
        }
    }
    Ok(())
}

/// Bar interval of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1w")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
}

impl Timeframe {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "15m" => Some(Self::Min15),
            "1h" | "60m" => Some(Self::Hour1),
            "4h" => Some(Self::Hour4),
            "1d" | "d" | "D" => Some(Self::Day1),
            "1w" | "1wk" | "w" | "W" => Some(Self::Week1),
            "1M" | "1mo" | "m" | "M" => Some(Self::Month1),
            _ => None,
        }
    }

    /// Short label used in file names and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Min15 => "15m",
            Self::Hour1 => "1h",
            Self::Hour4 => "4h",
            Self::Day1 => "1d",
            Self::Week1 => "1w",
            Self::Month1 => "1M",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
