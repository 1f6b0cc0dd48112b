//! Verdicts for new readings against the baseline table.

use crate::config::SingletonPolicy;
use crate::error::{AnomalyError, Result};
use crate::model::{Baseline, Verdict};
use crate::season::Season;

pub struct Evaluator {
    policy: SingletonPolicy,
}

impl Evaluator {
    pub fn new(policy: SingletonPolicy) -> Self {
        Self { policy }
    }

    /// Judge `reading` against the baseline of `city` in `season`.
    ///
    /// A reading equal to either bound is anomalous.
    ///
    /// # Errors
    /// [`AnomalyError::InvalidReading`] if `reading` is not finite,
    /// [`AnomalyError::BaselineNotFound`] if the pair has no history, and
    /// [`AnomalyError::InsufficientData`] if its band is undefined under
    /// [`SingletonPolicy::Reject`].
    pub fn evaluate(
        &self,
        baselines: &[Baseline],
        reading: f64,
        city: &str,
        season: Season,
    ) -> Result<Verdict> {
        if !reading.is_finite() {
            return Err(AnomalyError::InvalidReading(reading));
        }

        let baseline = baselines
            .iter()
            .find(|baseline| baseline.city == city && baseline.season == season)
            .ok_or_else(|| AnomalyError::BaselineNotFound {
                city: city.to_string(),
                season,
            })?;

        let is_anomalous = match (baseline.band, self.policy) {
            (Some(band), _) => band.touches_or_excludes(reading),
            (None, SingletonPolicy::Accept) => false,
            (None, SingletonPolicy::Reject) => {
                return Err(AnomalyError::InsufficientData {
                    city: city.to_string(),
                    season,
                    n_obs: baseline.n_obs,
                });
            }
        };

        Ok(Verdict {
            city: city.to_string(),
            season,
            reading,
            is_anomalous,
            band: baseline.band,
        })
    }
}
