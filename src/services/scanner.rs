//! Batch scan over (symbol, timeframe) pairs.
//!
//! Every pair is fetched and evaluated independently, at most
//! `max_concurrency` at a time. A pair that fails (provider error, malformed
//! or short series) is recorded as a `ScanFailure` and the batch carries on.

use super::signals::{SignalAggregator, TrendFlipEngine};
use crate::error::AppError;
use crate::sources::MarketDataProvider;
use crate::types::{SignalRecord, Timeframe};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A pair that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFailure {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub reason: String,
}

/// Result of one batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Filtered and ordered records.
    pub records: Vec<SignalRecord>,
    /// Every successfully evaluated pair, before filtering.
    pub evaluated: Vec<SignalRecord>,
    /// Failed pairs, ordered by symbol then timeframe.
    pub failures: Vec<ScanFailure>,
}

pub struct Scanner {
    provider: Arc<dyn MarketDataProvider>,
    engine: TrendFlipEngine,
    aggregator: SignalAggregator,
    max_concurrency: usize,
}

impl Scanner {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        engine: TrendFlipEngine,
        aggregator: SignalAggregator,
        max_concurrency: usize,
    ) -> Self {
        Self {
            provider,
            engine,
            aggregator,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn engine(&self) -> &TrendFlipEngine {
        &self.engine
    }

    pub fn aggregator(&self) -> &SignalAggregator {
        &self.aggregator
    }

    /// Fetch and evaluate one pair.
    pub async fn scan_pair(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<SignalRecord, AppError> {
        let bars = self.provider.fetch_bars(symbol, timeframe).await?;
        let outcome = self.engine.run(&bars)?;
        debug!(
            "{} {}: {} after {} transitions",
            symbol, timeframe, outcome.state.position, outcome.transitions
        );
        Ok(self.aggregator.record(symbol, timeframe, &bars, &outcome))
    }

    /// Scan every (symbol, timeframe) combination.
    pub async fn scan(&self, symbols: &[String], timeframes: &[Timeframe]) -> ScanReport {
        let start = Instant::now();
        let pairs: Vec<(String, Timeframe)> = symbols
            .iter()
            .flat_map(|s| timeframes.iter().map(move |tf| (s.clone(), *tf)))
            .collect();
        let total = pairs.len();

        let results: Vec<(String, Timeframe, Result<SignalRecord, AppError>)> =
            stream::iter(pairs)
                .map(|(symbol, timeframe)| async move {
                    let result = self.scan_pair(&symbol, timeframe).await;
                    (symbol, timeframe, result)
                })
                .buffer_unordered(self.max_concurrency)
                .collect()
                .await;

        let mut records = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (symbol, timeframe, result) in results {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Skipping {} {}: {}", symbol, timeframe, e);
                    failures.push(ScanFailure {
                        symbol,
                        timeframe,
                        reason: e.to_string(),
                    });
                }
            }
        }
        failures.sort_by(|a, b| {
            a.symbol
                .cmp(&b.symbol)
                .then_with(|| a.timeframe.cmp(&b.timeframe))
        });

        let evaluated = records;
        let records = self.aggregator.aggregate(evaluated.clone());
        info!(
            "Scanned {} pairs in {:?}: {} evaluated, {} reported, {} failed",
            total,
            start.elapsed(),
            evaluated.len(),
            records.len(),
            failures.len()
        );

        ScanReport {
            records,
            evaluated,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::AggregatorConfig;
    use crate::sources::InMemoryProvider;
    use crate::types::Bar;

    fn create_wave_bars(count: usize) -> Vec<Bar> {
        let mut prev = 100.0;
        (0..count)
            .map(|i| {
                let close = 100.0 + 10.0 * (i as f64 / 6.0).sin();
                let open = prev;
                prev = close;
                Bar::new(
                    i as i64 * 86_400_000,
                    open,
                    open.max(close) + 1.0,
                    open.min(close) - 1.0,
                    close,
                    1000.0,
                )
            })
            .collect()
    }

    fn scanner(provider: InMemoryProvider, config: AggregatorConfig) -> Scanner {
        Scanner::new(
            Arc::new(provider),
            TrendFlipEngine::default(),
            SignalAggregator::new(config),
            4,
        )
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let provider = InMemoryProvider::new()
            .with_series("BTCUSDT", Timeframe::Day1, create_wave_bars(150))
            .with_series("SOLUSDT", Timeframe::Day1, create_wave_bars(10));
        let scanner = scanner(provider, AggregatorConfig::default());

        let symbols = vec![
            "SOLUSDT".to_string(),
            "ETHUSDT".to_string(),
            "BTCUSDT".to_string(),
        ];
        let report = scanner.scan(&symbols, &[Timeframe::Day1]).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].symbol, "BTCUSDT");
        assert_eq!(report.evaluated.len(), 1);

        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].symbol, "ETHUSDT");
        assert!(report.failures[0].reason.contains("No data"));
        assert_eq!(report.failures[1].symbol, "SOLUSDT");
        assert!(report.failures[1].reason.contains("Insufficient data"));
    }

    #[tokio::test]
    async fn test_scan_pair_matches_engine() {
        let bars = create_wave_bars(150);
        let provider = InMemoryProvider::new().with_series("BTCUSDT", Timeframe::Week1, bars.clone());
        let scanner = scanner(provider, AggregatorConfig::default());

        let record = scanner.scan_pair("BTCUSDT", Timeframe::Week1).await.unwrap();
        let outcome = TrendFlipEngine::default().run(&bars).unwrap();
        assert_eq!(record.flip_time, outcome.flip_time());
        assert_eq!(record.entry_price, outcome.state.entry_price);
        assert_eq!(record.last_close, bars[149].close);
    }

    #[tokio::test]
    async fn test_malformed_series_is_a_failure() {
        let mut bars = create_wave_bars(150);
        bars[70].high = bars[70].low - 5.0;
        let provider = InMemoryProvider::new().with_series("BTCUSDT", Timeframe::Day1, bars);
        let scanner = scanner(provider, AggregatorConfig::default());

        let report = scanner.scan(&["BTCUSDT".to_string()], &[Timeframe::Day1]).await;
        assert!(report.records.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("index 70"));
    }

    #[tokio::test]
    async fn test_scan_every_pair_once() {
        let mut provider = InMemoryProvider::new();
        for symbol in ["AAA", "BBB", "CCC"] {
            for tf in [Timeframe::Hour4, Timeframe::Day1] {
                provider.insert(symbol, tf, create_wave_bars(120));
            }
        }
        let scanner = scanner(provider, AggregatorConfig::default());

        let symbols: Vec<String> = ["AAA", "BBB", "CCC"].iter().map(|s| s.to_string()).collect();
        let report = scanner
            .scan(&symbols, &[Timeframe::Hour4, Timeframe::Day1])
            .await;

        assert_eq!(report.records.len(), 6);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_evaluated_keeps_filtered_records() {
        // 64 bars end FLAT, 150 bars end holding a LONG
        let provider = InMemoryProvider::new()
            .with_series("BTCUSDT", Timeframe::Day1, create_wave_bars(64))
            .with_series("BTCUSDT", Timeframe::Week1, create_wave_bars(150));
        let scanner = scanner(
            provider,
            AggregatorConfig {
                only_active: true,
                ..Default::default()
            },
        );

        let report = scanner
            .scan(&["BTCUSDT".to_string()], &[Timeframe::Day1, Timeframe::Week1])
            .await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].timeframe, Timeframe::Week1);
        assert_eq!(report.evaluated.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let scanner = scanner(InMemoryProvider::new(), AggregatorConfig::default());
        let report = scanner.scan(&[], &[Timeframe::Day1]).await;
        assert!(report.records.is_empty());
        assert!(report.failures.is_empty());
    }
}
