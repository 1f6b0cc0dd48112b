//! Error types of the anomaly engine.

use crate::season::Season;
use thiserror::Error;

/// Errors returned by the statistics builder, the evaluator and the dataset reader.
#[derive(Debug, Error)]
pub enum AnomalyError {
    /// No historical observation exists for the requested city and season.
    #[error("no baseline for city {city:?} in {season}")]
    BaselineNotFound { city: String, season: Season },

    /// The baseline exists but its band is undefined (fewer than 2 observations).
    #[error("insufficient data for city {city:?} in {season}: need at least 2 observations, got {n_obs}")]
    InsufficientData {
        city: String,
        season: Season,
        n_obs: usize,
    },

    /// A live reading is NaN or infinite.
    #[error("reading must be finite, but is {0}")]
    InvalidReading(f64),

    /// A data row could not be turned into an observation.
    #[error("malformed input at row {row}: {reason}")]
    MalformedInput { row: usize, reason: String },

    /// A required column is absent from the header.
    #[error("missing required column {0:?}")]
    MissingColumn(String),

    /// A selection of observations turned out to be empty.
    #[error("no observations match the selection")]
    EmptySelection,

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AnomalyError>;
