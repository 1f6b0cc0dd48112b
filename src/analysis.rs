//! Statistics builder and descriptive reports over annotated observations.

use crate::config::AnalysisConfig;
use crate::error::{AnomalyError, Result};
use crate::model::{AnnotatedObservation, Band, Baseline, Observation};
use crate::season::Season;
use crate::stats::{Accumulator, AccumulatorReport, Summary, rolling_means};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Builds rolling averages, seasonal baselines and anomaly labels.
pub struct Analyzer {
    cfg: AnalysisConfig,
}

/// Mean and spread of one season for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonProfile {
    pub season: Season,
    pub n_obs: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
}

impl Analyzer {
    pub fn new(cfg: AnalysisConfig) -> Self {
        Self { cfg }
    }

    /// Annotate every observation, returned ordered by city then timestamp.
    pub fn build_statistics(&self, mut observations: Vec<Observation>) -> Vec<AnnotatedObservation> {
        // Stable, so equal timestamps keep their input order.
        observations.sort_by(|a, b| {
            a.city
                .cmp(&b.city)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });

        let mut annotated = Vec::with_capacity(observations.len());
        for city_obs in observations.chunk_by(|a, b| a.city == b.city) {
            let groups = season_reports(city_obs);
            let temps: Vec<f64> = city_obs.iter().map(|obs| obs.temperature).collect();
            let rolling = rolling_means(&temps, self.cfg.rolling_window);

            for (obs, rolling_avg) in city_obs.iter().zip(rolling) {
                let season = Season::of(&obs.timestamp);
                let report = &groups[&season];
                let band = self.band(report);

                annotated.push(AnnotatedObservation {
                    city: obs.city.clone(),
                    timestamp: obs.timestamp,
                    temperature: obs.temperature,
                    rolling_avg,
                    season,
                    year: obs.timestamp.year(),
                    season_city_mean: report.mean,
                    season_city_std: report.std_dev,
                    is_anomalous: band.is_some_and(|band| band.excludes(obs.temperature)),
                });
            }
        }

        annotated
    }

    /// One baseline per (city, season) present, ordered by city then season.
    pub fn baseline_table(&self, annotated: &[AnnotatedObservation]) -> Vec<Baseline> {
        let mut table: BTreeMap<(&str, Season), Baseline> = BTreeMap::new();
        for row in annotated {
            table
                .entry((row.city.as_str(), row.season))
                .and_modify(|baseline| baseline.n_obs += 1)
                .or_insert_with(|| Baseline {
                    city: row.city.clone(),
                    season: row.season,
                    n_obs: 1,
                    mean: row.season_city_mean,
                    std_dev: row.season_city_std,
                    band: row
                        .season_city_std
                        .map(|std_dev| Band::around(row.season_city_mean, std_dev, self.cfg.band_width)),
                });
        }
        table.into_values().collect()
    }

    fn band(&self, report: &AccumulatorReport) -> Option<Band> {
        report
            .std_dev
            .map(|std_dev| Band::around(report.mean, std_dev, self.cfg.band_width))
    }
}

/// Per-season statistics of the readings of a single city.
fn season_reports(city_obs: &[Observation]) -> BTreeMap<Season, AccumulatorReport> {
    let mut groups: BTreeMap<Season, Accumulator> = BTreeMap::new();
    for obs in city_obs {
        groups
            .entry(Season::of(&obs.timestamp))
            .or_insert_with(Accumulator::new)
            .add(obs.temperature);
    }
    groups
        .into_iter()
        .map(|(key, acc)| (key, acc.report()))
        .collect()
}

/// Distinct cities, sorted.
pub fn cities(annotated: &[AnnotatedObservation]) -> Vec<String> {
    annotated
        .iter()
        .map(|row| row.city.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// First and last calendar year observed for `city`.
pub fn year_range(annotated: &[AnnotatedObservation], city: &str) -> Option<(i32, i32)> {
    let years = annotated.iter().filter(|row| row.city == city).map(|row| row.year);
    let min = years.clone().min()?;
    let max = years.max()?;
    Some((min, max))
}

/// Descriptive statistics of a city's temperatures, optionally narrowed to a season and a year.
pub fn describe(
    annotated: &[AnnotatedObservation],
    city: &str,
    season: Option<Season>,
    year: Option<i32>,
) -> Result<Summary> {
    let temps: Vec<f64> = annotated
        .iter()
        .filter(|row| row.city == city)
        .filter(|row| season.is_none_or(|season| row.season == season))
        .filter(|row| year.is_none_or(|year| row.year == year))
        .map(|row| row.temperature)
        .collect();
    Summary::of(&temps).ok_or(AnomalyError::EmptySelection)
}

/// Per-season mean and standard deviation for `city`, in season order.
pub fn seasonal_profile(annotated: &[AnnotatedObservation], city: &str) -> Vec<SeasonProfile> {
    let mut accs: BTreeMap<Season, Accumulator> = BTreeMap::new();
    for row in annotated.iter().filter(|row| row.city == city) {
        accs.entry(row.season)
            .or_insert_with(Accumulator::new)
            .add(row.temperature);
    }
    accs.into_iter()
        .map(|(season, acc)| {
            let report = acc.report();
            SeasonProfile {
                season,
                n_obs: report.n_vals,
                mean: report.mean,
                std_dev: report.std_dev,
            }
        })
        .collect()
}

/// Anomalous historical readings of `city`, in chronological order.
pub fn anomalies<'a>(
    annotated: &'a [AnnotatedObservation],
    city: &str,
) -> Vec<&'a AnnotatedObservation> {
    annotated
        .iter()
        .filter(|row| row.city == city && row.is_anomalous)
        .collect()
}
