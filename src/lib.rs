//! Trendflip - Heikin-Ashi / MACD trend-flip signal scanner

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ProviderError, SignalError};
pub use services::{Scanner, SignalAggregator, TrendFlipEngine};
pub use types::*;
