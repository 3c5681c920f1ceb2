//! Persisted candle-colour snapshot.
//!
//! Stores the latest Heikin-Ashi colour of every (symbol, timeframe) pair
//! in a JSON file so the next run can tell which symbols changed.

use crate::error::Result;
use crate::types::{CandleColor, ReportEntry, SignalRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Colours of one symbol keyed by timeframe label.
pub type ColorSet = BTreeMap<String, CandleColor>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    symbols: HashMap<String, ColorSet>,
}

/// JSON-file backed colour store.
#[derive(Debug)]
pub struct ColorStore {
    path: PathBuf,
    symbols: HashMap<String, ColorSet>,
}

impl ColorStore {
    /// Load the snapshot at `path`.
    ///
    /// A missing or unreadable file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let symbols = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<StoreFile>(&content) {
                Ok(file) => file.symbols,
                Err(e) => {
                    warn!("Failed to parse colour store {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => {
                debug!("No colour store at {}", path.display());
                HashMap::new()
            }
        };

        Self { path, symbols }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, symbol: &str) -> Option<&ColorSet> {
        self.symbols.get(symbol)
    }

    /// Colour set of one symbol built from its records.
    pub fn colors_of(records: &[SignalRecord]) -> ColorSet {
        records
            .iter()
            .map(|r| (r.timeframe.label().to_string(), r.color))
            .collect()
    }

    /// Whether `current` differs from the stored set.
    ///
    /// A symbol seen for the first time counts as changed.
    pub fn changed(&self, symbol: &str, current: &ColorSet) -> bool {
        self.symbols.get(symbol) != Some(current)
    }

    pub fn update(&mut self, symbol: &str, current: ColorSet) {
        self.symbols.insert(symbol.to_string(), current);
    }

    /// Diff and update every evaluated symbol, flagging changed entries.
    ///
    /// Colour sets come from `evaluated`, not from the report entries, so
    /// timeframes hidden by report filters still count toward the diff.
    /// Returns the number of changed symbols.
    pub fn apply(&mut self, entries: &mut [ReportEntry], evaluated: &[SignalRecord]) -> usize {
        let mut by_symbol: BTreeMap<&str, Vec<SignalRecord>> = BTreeMap::new();
        for record in evaluated {
            by_symbol
                .entry(record.symbol.as_str())
                .or_default()
                .push(record.clone());
        }

        let mut changed = 0;
        for (symbol, records) in by_symbol {
            let colors = Self::colors_of(&records);
            let moved = self.changed(symbol, &colors);
            if moved {
                changed += 1;
            }
            if let Some(entry) = entries.iter_mut().find(|e| e.symbol == symbol) {
                entry.changed = moved;
            }
            self.update(symbol, colors);
        }

        debug!("{} symbols changed colour", changed);
        changed
    }

    /// Write the snapshot back to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = StoreFile {
            symbols: self.symbols.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        debug!("Saved colour store to {}", self.path.display());
        Ok(())
    }
}
