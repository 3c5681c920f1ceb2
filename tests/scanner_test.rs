//! End-to-end tests: JSON files -> scanner -> report

use chrono::{TimeZone, Utc};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use trendflip::services::signals::{group_by_symbol, AggregatorConfig};
use trendflip::services::{
    chunk_message, format_report, ColorStore, Scanner, SignalAggregator, TrendFlipEngine,
};
use trendflip::sources::{FallbackProvider, JsonFileProvider, MarketDataProvider};
use trendflip::types::*;

const DAY_MS: i64 = 86_400_000;

fn create_wave_bars(count: usize) -> Vec<Bar> {
    let mut prev = 100.0;
    (0..count)
        .map(|i| {
            let close = 100.0 + 10.0 * (i as f64 / 6.0).sin();
            let open = prev;
            prev = close;
            Bar::new(
                i as i64 * DAY_MS,
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

fn write_series(dir: &Path, symbol: &str, timeframe: Timeframe, bars: &[Bar]) {
    let path = dir.join(format!("{}_{}.json", symbol, timeframe.label()));
    fs::write(path, serde_json::to_string(bars).unwrap()).unwrap();
}

fn scanner(provider: Arc<dyn MarketDataProvider>, config: AggregatorConfig) -> Scanner {
    Scanner::new(
        provider,
        TrendFlipEngine::default(),
        SignalAggregator::new(config),
        2,
    )
}

#[tokio::test]
async fn test_scan_from_json_files() {
    let dir = tempfile::tempdir().unwrap();
    write_series(dir.path(), "BTCUSDT", Timeframe::Day1, &create_wave_bars(52));
    write_series(dir.path(), "BTCUSDT", Timeframe::Week1, &create_wave_bars(150));
    write_series(dir.path(), "ETHUSDT", Timeframe::Day1, &create_wave_bars(64));
    fs::write(dir.path().join("ETHUSDT_1w.json"), "[]").unwrap();

    let scanner = scanner(
        Arc::new(JsonFileProvider::new(dir.path())),
        AggregatorConfig::default(),
    );
    let symbols = vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()];
    let report = scanner
        .scan(&symbols, &[Timeframe::Day1, Timeframe::Week1])
        .await;

    assert_eq!(report.records.len(), 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].symbol, "ETHUSDT");
    assert_eq!(report.failures[0].timeframe, Timeframe::Week1);
    assert!(report.failures[0].reason.contains("Insufficient data"));

    // New active flip first, then the fresh exit, then the older position
    assert_eq!(report.records[0].symbol, "BTCUSDT");
    assert_eq!(report.records[0].timeframe, Timeframe::Day1);
    assert_eq!(report.records[0].state, ReportedState::Short);
    assert_eq!(report.records[1].symbol, "ETHUSDT");
    assert_eq!(report.records[1].state, ReportedState::Flat);
    assert_eq!(report.records[2].timeframe, Timeframe::Week1);
    assert_eq!(report.records[2].state, ReportedState::Long);
}

#[tokio::test]
async fn test_fallback_directory() {
    let primary = tempfile::tempdir().unwrap();
    let backup = tempfile::tempdir().unwrap();
    write_series(backup.path(), "SOLUSDT", Timeframe::Day1, &create_wave_bars(150));

    let provider = FallbackProvider::new(vec![
        Arc::new(JsonFileProvider::new(primary.path())) as Arc<dyn MarketDataProvider>,
        Arc::new(JsonFileProvider::new(backup.path())),
    ]);
    let scanner = scanner(Arc::new(provider), AggregatorConfig::default());

    let report = scanner
        .scan(&["SOLUSDT".to_string()], &[Timeframe::Day1])
        .await;
    assert_eq!(report.records.len(), 1);
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_report_and_color_store() {
    let dir = tempfile::tempdir().unwrap();
    write_series(dir.path(), "BTCUSDT", Timeframe::Day1, &create_wave_bars(52));
    write_series(dir.path(), "BTCUSDT", Timeframe::Week1, &create_wave_bars(150));

    let scanner = scanner(
        Arc::new(JsonFileProvider::new(dir.path())),
        AggregatorConfig::default(),
    );
    let report = scanner
        .scan(&["BTCUSDT".to_string()], &[Timeframe::Day1, Timeframe::Week1])
        .await;
    let mut entries = group_by_symbol(&report.records);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].records[0].timeframe, Timeframe::Day1);

    let state_path = dir.path().join("colors.json");
    let mut store = ColorStore::load(&state_path);
    assert_eq!(store.apply(&mut entries, &report.evaluated), 1);
    store.save().unwrap();
    assert!(entries[0].changed);
    let colors = ColorStore::colors_of(&report.evaluated);

    // Same colours on the next run
    let store = ColorStore::load(&state_path);
    assert!(!store.changed("BTCUSDT", &colors));

    let now = Utc.timestamp_millis_opt(1_704_067_200_000).unwrap();
    let text = format_report(&entries, now);
    assert!(text.starts_with("Trend flips 2024-01-01 00:00 UTC"));
    assert!(text.contains("BTCUSDT (changed)"));
    assert!(text.contains("[NEW] 1d SHORT"));
    assert!(text.contains("1w LONG"));

    let chunks = chunk_message(&text, 60);
    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.chars().count() <= 60));
}

#[tokio::test]
async fn test_color_store_sees_filtered_timeframes() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("colors.json");
    // 1d ends FLAT on its last bar, 1w holds a LONG
    write_series(dir.path(), "BTCUSDT", Timeframe::Day1, &create_wave_bars(64));
    write_series(dir.path(), "BTCUSDT", Timeframe::Week1, &create_wave_bars(150));

    let scanner = scanner(
        Arc::new(JsonFileProvider::new(dir.path())),
        AggregatorConfig {
            only_active: true,
            ..Default::default()
        },
    );
    let symbols = vec!["BTCUSDT".to_string()];
    let timeframes = [Timeframe::Day1, Timeframe::Week1];

    let report = scanner.scan(&symbols, &timeframes).await;
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.evaluated.len(), 2);

    let mut entries = group_by_symbol(&report.records);
    let mut store = ColorStore::load(&state_path);
    store.apply(&mut entries, &report.evaluated);
    store.save().unwrap();
    assert!(entries[0].changed);

    // The hidden 1d colour is remembered too
    let stored = ColorStore::load(&state_path);
    assert_eq!(stored.get("BTCUSDT").map(|s| s.len()), Some(2));

    // Unchanged data on the next run is not flagged
    let report = scanner.scan(&symbols, &timeframes).await;
    let mut entries = group_by_symbol(&report.records);
    let mut store = ColorStore::load(&state_path);
    assert_eq!(store.apply(&mut entries, &report.evaluated), 0);
    assert!(!entries[0].changed);
}
