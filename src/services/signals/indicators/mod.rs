//! Oscillator implementations.

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use adx::Adx;
pub use bollinger::BollingerBands;
pub use ema::Ema;
pub use macd::Macd;
pub use rsi::Rsi;
