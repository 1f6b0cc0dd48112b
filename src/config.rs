use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Analysis configuration parameters.
///
/// Loaded from an optional TOML file and validated before use.
/// Every field has a default, see [`Config::default`].
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Number of readings in the rolling average window.
    pub rolling_window: usize,
    /// Half-width of the normal band in standard deviations.
    pub band_width: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rolling_window: 30,
            band_width: 2.0,
        }
    }
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationConfig {
    pub singleton_policy: SingletonPolicy,
}

/// How a reading is judged against a baseline whose band is undefined.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingletonPolicy {
    /// Fail with an insufficient data error.
    #[default]
    Reject,
    /// Treat every reading as not anomalous.
    Accept,
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.analysis.rolling_window, 1..=10_000)
            .context("invalid rolling window")?;
        if self.analysis.band_width <= 0.0 {
            bail!("band width must be positive, but is {}", self.analysis.band_width);
        }
        check_num(self.analysis.band_width, ..=10.0).context("invalid band width")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
