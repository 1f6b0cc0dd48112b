use crate::analysis::{self, Analyzer};
use crate::config::Config;
use crate::data;
use crate::evaluator::Evaluator;
use crate::model::{AnnotatedObservation, Baseline};
use crate::season::{Clock, Season, current_season};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

/// Loads a dataset once and answers the commands of one invocation.
pub struct Manager {
    cfg: Config,
    annotated: Vec<AnnotatedObservation>,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(data_file: P, cfg: Config) -> Result<Self> {
        let data_file = data_file.as_ref();
        let file = File::open(data_file).with_context(|| format!("failed to open {data_file:?}"))?;
        let observations = data::read_observations(BufReader::new(file))
            .with_context(|| format!("failed to read {data_file:?}"))?;
        if observations.is_empty() {
            bail!("{data_file:?} contains no observations");
        }
        log::info!("read {} observations from {data_file:?}", observations.len());

        let annotated = Analyzer::new(cfg.analysis.clone()).build_statistics(observations);

        Ok(Self { cfg, annotated })
    }

    pub fn analyze<P: AsRef<Path>>(&self, out_dir: P) -> Result<()> {
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir).with_context(|| format!("failed to create {out_dir:?}"))?;

        let annotated_file = out_dir.join("annotated.csv");
        data::write_annotated(create(&annotated_file)?, &self.annotated)
            .with_context(|| format!("failed to write {annotated_file:?}"))?;
        log::info!("wrote {annotated_file:?}");

        let baselines_file = out_dir.join("baselines.json");
        data::write_baselines(create(&baselines_file)?, &self.baselines())
            .with_context(|| format!("failed to write {baselines_file:?}"))?;
        log::info!("wrote {baselines_file:?}");

        let n_anomalous = self.annotated.iter().filter(|row| row.is_anomalous).count();
        log::info!("flagged {n_anomalous} of {} readings", self.annotated.len());

        Ok(())
    }

    pub fn evaluate(
        &self,
        city: &str,
        temperature: f64,
        season: Option<Season>,
        clock: &dyn Clock,
    ) -> Result<()> {
        let season = season.unwrap_or_else(|| current_season(clock));
        log::info!("evaluating {temperature} in {city:?} for {season}");

        let evaluator = Evaluator::new(self.cfg.evaluation.singleton_policy);
        let verdict = evaluator
            .evaluate(&self.baselines(), temperature, city, season)
            .context("failed to evaluate reading")?;

        print_json(&verdict)
    }

    pub fn describe(&self, city: &str, season: Option<Season>, year: Option<i32>) -> Result<()> {
        self.check_city(city)?;
        let summary = analysis::describe(&self.annotated, city, season, year)
            .with_context(|| format!("failed to describe {city:?}"))?;
        print_json(&summary)
    }

    pub fn profile(&self, city: &str) -> Result<()> {
        self.check_city(city)?;
        let (first_year, last_year) =
            analysis::year_range(&self.annotated, city).context("city has no readings")?;
        let report = serde_json::json!({
            "city": city,
            "first_year": first_year,
            "last_year": last_year,
            "seasons": analysis::seasonal_profile(&self.annotated, city),
            "anomalies": analysis::anomalies(&self.annotated, city),
        });
        print_json(&report)
    }

    pub fn cities(&self) -> Result<()> {
        print_json(&analysis::cities(&self.annotated))
    }

    fn baselines(&self) -> Vec<Baseline> {
        Analyzer::new(self.cfg.analysis.clone()).baseline_table(&self.annotated)
    }

    fn check_city(&self, city: &str) -> Result<()> {
        if !self.annotated.iter().any(|row| row.city == city) {
            bail!("unknown city {city:?}");
        }
        Ok(())
    }
}

fn create(file: &Path) -> Result<BufWriter<File>> {
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    Ok(BufWriter::new(file))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("failed to serialize output")?;
    writeln!(stdout).context("failed to write output")?;
    Ok(())
}
