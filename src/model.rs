use crate::season::Season;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub city: String,

    pub timestamp: NaiveDateTime,

    pub temperature: f64,
}

impl Observation {
    pub fn new(city: impl Into<String>, timestamp: NaiveDateTime, temperature: f64) -> Self {
        Self {
            city: city.into(),
            timestamp,
            temperature,
        }
    }
}

/// Observation enriched with rolling and seasonal statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedObservation {
    pub city: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,

    /// Mean of the current and up to `rolling_window - 1` prior readings of the city.
    pub rolling_avg: f64,

    pub season: Season,
    pub year: i32,

    /// Mean temperature of the (season, city) group.
    pub season_city_mean: f64,
    /// Sample standard deviation of the (season, city) group, `None` for single-row groups.
    pub season_city_std: Option<f64>,

    pub is_anomalous: bool,
}

/// Normal-range interval `[mean - k * std, mean + k * std]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

impl Band {
    pub fn around(mean: f64, std_dev: f64, width: f64) -> Self {
        Self {
            lower: mean - width * std_dev,
            upper: mean + width * std_dev,
        }
    }

    /// Strictly below `lower` or strictly above `upper`.
    pub fn excludes(&self, val: f64) -> bool {
        val < self.lower || val > self.upper
    }

    /// At or beyond either bound.
    pub fn touches_or_excludes(&self, val: f64) -> bool {
        val <= self.lower || val >= self.upper
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub city: String,
    pub season: Season,

    pub n_obs: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,

    /// Undefined when `std_dev` is.
    pub band: Option<Band>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub city: String,
    pub season: Season,
    pub reading: f64,
    pub is_anomalous: bool,
    pub band: Option<Band>,
}
