//! In-memory provider, mostly for tests and replaying captured series.

use super::MarketDataProvider;
use crate::error::ProviderError;
use crate::types::{Bar, Timeframe};
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct InMemoryProvider {
    series: HashMap<(String, Timeframe), Vec<Bar>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a series. Symbols are matched case-insensitively.
    pub fn with_series(mut self, symbol: &str, timeframe: Timeframe, bars: Vec<Bar>) -> Self {
        self.insert(symbol, timeframe, bars);
        self
    }

    pub fn insert(&mut self, symbol: &str, timeframe: Timeframe, bars: Vec<Bar>) {
        self.series.insert((symbol.to_uppercase(), timeframe), bars);
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Bar>, ProviderError> {
        self.series
            .get(&(symbol.to_uppercase(), timeframe))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                symbol: symbol.to_string(),
                timeframe: timeframe.label().to_string(),
            })
    }
}
