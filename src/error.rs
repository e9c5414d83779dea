use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Forecast length mismatch: revenue has {revenue} periods, expenses have {expenses}")]
    LengthMismatch { revenue: usize, expenses: usize },

    #[error("Invalid forecast horizon {0}: must be at least one month")]
    InvalidHorizon(usize),

    #[error(
        "Invalid multiplier {value} for scenario '{scenario}': must be finite and non-negative"
    )]
    InvalidMultiplier { scenario: String, value: f64 },

    #[error("Invalid amount {value} in {context}: must be finite and non-negative")]
    InvalidAmount { context: String, value: f64 },

    #[error("Invalid entry kind '{0}': expected 'revenue' or 'expense'")]
    InvalidEntryKind(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Clustering error: {0}")]
    Clustering(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ForecastError {
    /// True for the expected "nothing to segment" outcome, as opposed to a defect.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ForecastError::InsufficientData(_))
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
