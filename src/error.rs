use thiserror::Error;

/// Errors raised while turning a bar series into a signal.
///
/// All of these are recoverable per (symbol, timeframe): the scanner logs
/// them and moves on to the next pair.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("Insufficient data: need {required} bars, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("Undefined oscillator value at index {index}")]
    UndefinedOscillatorValue { index: usize },

    #[error("Malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },
}

/// Errors raised by market data providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No data for {symbol} ({timeframe})")]
    NotFound { symbol: String, timeframe: String },

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = SignalError::InsufficientData {
            required: 35,
            got: 10,
        };
        assert_eq!(err.to_string(), "Insufficient data: need 35 bars, got 10");
    }

    #[test]
    fn test_malformed_bar_message() {
        let err = SignalError::MalformedBar {
            index: 3,
            reason: "close is NaN".to_string(),
        };
        assert!(err.to_string().contains("index 3"));
        assert!(err.to_string().contains("close is NaN"));
    }

    #[test]
    fn test_app_error_from_signal_error() {
        let err: AppError = SignalError::UndefinedOscillatorValue { index: 5 }.into();
        assert!(matches!(err, AppError::Signal(_)));
    }

    #[test]
    fn test_app_error_from_provider_error() {
        let err: AppError = ProviderError::Unavailable("all providers failed".to_string()).into();
        assert_eq!(err.to_string(), "Provider unavailable: all providers failed");
    }
}
