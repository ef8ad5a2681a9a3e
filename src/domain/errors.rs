use thiserror::Error;

/// Errors raised while rebuilding the categorization model
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Training corpus has {labels} distinct labels, need at least 2")]
    TooFewLabels { labels: usize },

    #[error("Training corpus is empty")]
    EmptyCorpus,

    #[error("Base model fit failed ({model}): {reason}")]
    FitFailed { model: &'static str, reason: String },
}

/// Errors raised by forecast backtest validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Need at least {required} days of history, have {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("Need more than {test_periods} months of data, have {months}")]
    TooFewMonths { months: usize, test_periods: usize },
}

/// Errors raised by the persistence adapters (feedback and model stores)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record in {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}
