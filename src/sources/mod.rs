//! Market data providers.
//!
//! A provider returns the bar series of one (symbol, timeframe) pair,
//! ordered by time. Providers are selected at runtime through
//! `Arc<dyn MarketDataProvider>`.

pub mod file;
pub mod memory;

pub use file::JsonFileProvider;
pub use memory::InMemoryProvider;

use crate::error::ProviderError;
use crate::types::{Bar, Timeframe};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// Fetch the bar series of one pair, oldest first.
    async fn fetch_bars(&self, symbol: &str, timeframe: Timeframe)
        -> Result<Vec<Bar>, ProviderError>;
}

/// Tries each provider in priority order until one returns bars.
///
/// An empty series counts as a miss and falls through to the next provider.
pub struct FallbackProvider {
    providers: Vec<Arc<dyn MarketDataProvider>>,
}

impl FallbackProvider {
    pub fn new(providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl MarketDataProvider for FallbackProvider {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Bar>, ProviderError> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.fetch_bars(symbol, timeframe).await {
                Ok(bars) if !bars.is_empty() => {
                    debug!(
                        "{} served {} {} ({} bars)",
                        provider.name(),
                        symbol,
                        timeframe,
                        bars.len()
                    );
                    return Ok(bars);
                }
                Ok(_) => {
                    debug!("{} returned no bars for {} {}", provider.name(), symbol, timeframe);
                }
                Err(e) => {
                    warn!("{} failed for {} {}: {}", provider.name(), symbol, timeframe, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::NotFound {
            symbol: symbol.to_string(),
            timeframe: timeframe.label().to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(count: usize, start: f64) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let close = start + i as f64;
                Bar::new(i as i64 * 60_000, close, close + 1.0, close - 1.0, close, 1.0)
            })
            .collect()
    }

    struct FailingProvider;

    #[async_trait]
    impl MarketDataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch_bars(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
        ) -> Result<Vec<Bar>, ProviderError> {
            Err(ProviderError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fallback_skips_failing_provider() {
        let backup = InMemoryProvider::new().with_series("BTCUSDT", Timeframe::Day1, bars(5, 100.0));
        let fallback = FallbackProvider::new(vec![Arc::new(FailingProvider), Arc::new(backup)]);

        let got = fallback.fetch_bars("BTCUSDT", Timeframe::Day1).await.unwrap();
        assert_eq!(got.len(), 5);
    }

    #[tokio::test]
    async fn test_fallback_prefers_first_provider() {
        let primary = InMemoryProvider::new().with_series("BTCUSDT", Timeframe::Day1, bars(3, 1.0));
        let backup = InMemoryProvider::new().with_series("BTCUSDT", Timeframe::Day1, bars(5, 100.0));
        let fallback = FallbackProvider::new(vec![Arc::new(primary), Arc::new(backup)]);

        let got = fallback.fetch_bars("BTCUSDT", Timeframe::Day1).await.unwrap();
        assert_eq!(got.len(), 3);
    }

    #[tokio::test]
    async fn test_fallback_empty_series_falls_through() {
        let primary = InMemoryProvider::new().with_series("BTCUSDT", Timeframe::Day1, Vec::new());
        let backup = InMemoryProvider::new().with_series("BTCUSDT", Timeframe::Day1, bars(5, 100.0));
        let fallback = FallbackProvider::new(vec![Arc::new(primary), Arc::new(backup)]);

        let got = fallback.fetch_bars("BTCUSDT", Timeframe::Day1).await.unwrap();
        assert_eq!(got.len(), 5);
    }

    #[tokio::test]
    async fn test_fallback_returns_last_error() {
        let fallback = FallbackProvider::new(vec![Arc::new(FailingProvider)]);
        let err = fallback.fetch_bars("BTCUSDT", Timeframe::Day1).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_fallback_without_providers() {
        let fallback = FallbackProvider::new(Vec::new());
        assert!(fallback.is_empty());
        let err = fallback.fetch_bars("ETHUSDT", Timeframe::Hour4).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound { .. }));
        assert!(err.to_string().contains("4h"));
    }
}
