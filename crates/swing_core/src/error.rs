use thiserror::Error;

/// Errors raised by the body analysis pipeline.
///
/// Insufficient signal (low-confidence landmarks, no swing found) is never an
/// error; it is reported through result fields. These variants cover caller
/// precondition violations only.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the calibration trainer and model (de)serialization.
#[derive(Error, Debug)]
pub enum CalibrationError {
    /// Fewer than the minimum number of total pairs were handed to a
    /// regression, before any filtering took place.
    #[error("Insufficient training pairs: {found} provided, at least {required} required")]
    InsufficientPairs { found: usize, required: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            AnalysisError::InvalidParameter(_) => true,
            AnalysisError::Config(_) => true,
            AnalysisError::Serialization(_) => false,
        }
    }
}

impl From<serde_yaml::Error> for AnalysisError {
    fn from(err: serde_yaml::Error) -> Self {
        AnalysisError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
