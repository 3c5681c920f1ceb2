use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trendflip::config::Config;
use trendflip::services::signals::group_by_symbol;
use trendflip::services::{
    chunk_message, format_report, ColorStore, Scanner, SignalAggregator, TrendFlipEngine,
};
use trendflip::sources::{FallbackProvider, JsonFileProvider, MarketDataProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendflip=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Scanning {} symbols x {} timeframes from {}",
        config.symbols.len(),
        config.timeframes.len(),
        config.data_dir.display()
    );

    let primary: Arc<dyn MarketDataProvider> = Arc::new(JsonFileProvider::new(&config.data_dir));
    let provider: Arc<dyn MarketDataProvider> = match config.fallback_data_dir {
        Some(ref dir) => Arc::new(FallbackProvider::new(vec![
            primary,
            Arc::new(JsonFileProvider::new(dir)),
        ])),
        None => primary,
    };

    let scanner = Scanner::new(
        provider,
        TrendFlipEngine::new(config.engine),
        SignalAggregator::new(config.aggregator),
        config.max_concurrency,
    );
    let scan = scanner.scan(&config.symbols, &config.timeframes).await;

    for failure in &scan.failures {
        warn!(
            "{} {} not evaluated: {}",
            failure.symbol, failure.timeframe, failure.reason
        );
    }

    let mut entries = group_by_symbol(&scan.records);

    // Flag symbols whose candle colours moved since the previous run
    if let Some(ref path) = config.color_state_file {
        let mut store = ColorStore::load(path);
        let changed = store.apply(&mut entries, &scan.evaluated);
        info!("{} symbols changed colour since the last run", changed);
        if let Err(e) = store.save() {
            warn!("Failed to save colour store: {}", e);
        }
    }

    let report = format_report(&entries, Utc::now());
    for chunk in chunk_message(&report, config.message_chunk_chars) {
        println!("{}\n", chunk);
    }

    info!(
        "Done: {} records, {} failures",
        scan.records.len(),
        scan.failures.len()
    );
    Ok(())
}
