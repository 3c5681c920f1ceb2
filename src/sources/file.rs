//! JSON file provider.
//!
//! Reads `<dir>/<SYMBOL>_<timeframe>.json`, e.g. `data/BTCUSDT_1d.json`.
//! The file holds either a bare array of bars or an object with a `bars`
//! array; bar times are epoch milliseconds.

use super::MarketDataProvider;
use crate::error::ProviderError;
use crate::types::{Bar, Timeframe};
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeriesFile {
    Bare(Vec<Bar>),
    Wrapped { bars: Vec<Bar> },
}

impl SeriesFile {
    fn into_bars(self) -> Vec<Bar> {
        match self {
            SeriesFile::Bare(bars) => bars,
            SeriesFile::Wrapped { bars } => bars,
        }
    }
}

/// Serves bar series from a directory of JSON files.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    dir: PathBuf,
}

impl JsonFileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a pair.
    pub fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        // Sanitize symbol for filesystem
        let safe = symbol
            .trim()
            .to_uppercase()
            .replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        self.dir.join(format!("{}_{}.json", safe, timeframe.label()))
    }
}

#[async_trait]
impl MarketDataProvider for JsonFileProvider {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Bar>, ProviderError> {
        let path = self.path_for(symbol, timeframe);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProviderError::NotFound {
                    symbol: symbol.to_string(),
                    timeframe: timeframe.label().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let bars = serde_json::from_str::<SeriesFile>(&content)?.into_bars();
        debug!("Loaded {} bars from {}", bars.len(), path.display());
        Ok(bars)
    }
}
