pub mod color_store;
pub mod report;
pub mod scanner;
pub mod signals;

pub use color_store::ColorStore;
pub use report::{chunk_message, format_report};
pub use scanner::{ScanFailure, ScanReport, Scanner};
pub use signals::{AggregatorConfig, EngineConfig, SignalAggregator, TrendFlipEngine};
