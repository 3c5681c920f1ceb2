use crate::services::report::DEFAULT_CHUNK_CHARS;
use crate::services::signals::{AggregatorConfig, EngineConfig, HaSeed};
use crate::types::Timeframe;
use std::env;
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Symbols to scan, upper-cased.
    pub symbols: Vec<String>,
    /// Timeframes to scan, shortest first.
    pub timeframes: Vec<Timeframe>,
    /// Directory served by the JSON file provider.
    pub data_dir: PathBuf,
    /// Secondary directory tried when a series is missing from `data_dir`.
    pub fallback_data_dir: Option<PathBuf>,
    /// Pairs evaluated concurrently.
    pub max_concurrency: usize,
    pub engine: EngineConfig,
    pub aggregator: AggregatorConfig,
    /// Where the last-run candle colours are kept, if anywhere.
    pub color_state_file: Option<PathBuf>,
    /// Per-message cap for the chunked report.
    pub message_chunk_chars: usize,
}

/// Parse a comma-separated symbol list, e.g. `"btcusdt, ETHUSDT"`.
pub fn parse_symbols(value: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in value.split(',').map(|s| s.trim().to_uppercase()) {
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

/// Parse a comma-separated timeframe list. Unknown labels are skipped.
pub fn parse_timeframes(value: &str) -> Vec<Timeframe> {
    let mut timeframes: Vec<Timeframe> = value.split(',').filter_map(Timeframe::from_str).collect();
    timeframes.sort();
    timeframes.dedup();
    timeframes
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let symbols = env::var("SYMBOLS")
            .ok()
            .map(|v| parse_symbols(&v))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]);

        let timeframes = env::var("TIMEFRAMES")
            .ok()
            .map(|v| parse_timeframes(&v))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| vec![Timeframe::Day1, Timeframe::Week1, Timeframe::Month1]);

        let defaults = EngineConfig::default();
        let mut engine = EngineConfig::default()
            .with_macd(
                env::var("MACD_FAST")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.macd_fast),
                env::var("MACD_SLOW")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.macd_slow),
                env::var("MACD_SIGNAL")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.macd_signal),
            )
            .with_ha_seed(
                env::var("HA_SEED")
                    .ok()
                    .and_then(|v| HaSeed::from_str(&v))
                    .unwrap_or_default(),
            )
            .with_zero_line(env_flag("REQUIRE_ZERO_LINE", true));

        let adx_period: usize = env::var("ADX_PERIOD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(14);

        // The ADX gate is only enabled when a threshold is given
        if let Some(threshold) = env::var("ADX_THRESHOLD").ok().and_then(|v| v.parse().ok()) {
            engine = engine.with_adx_gate(adx_period, threshold);
        }
        if let Some(period) = env::var("TREND_EMA_PERIOD").ok().and_then(|v| v.parse().ok()) {
            engine = engine.with_trend_ema(period);
        }

        let aggregator = AggregatorConfig {
            fresh_bars: env::var("FRESH_BARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            only_active: env_flag("ONLY_ACTIVE", false),
            min_adx: env::var("MIN_ADX").ok().and_then(|v| v.parse().ok()),
            report_weak_bias: env_flag("REPORT_WEAK_BIAS", true),
            adx_period,
            ..AggregatorConfig::default()
        };

        Self {
            symbols,
            timeframes,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            fallback_data_dir: env::var("FALLBACK_DATA_DIR").ok().map(PathBuf::from),
            max_concurrency: env::var("MAX_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
            engine,
            aggregator,
            color_state_file: env::var("COLOR_STATE_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            message_chunk_chars: env::var("MESSAGE_CHUNK_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CHUNK_CHARS),
        }
    }

    /// Number of (symbol, timeframe) pairs a scan covers.
    pub fn pair_count(&self) -> usize {
        self.symbols.len() * self.timeframes.len()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
