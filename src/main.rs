mod analysis;
mod config;
mod data;
mod error;
mod evaluator;
mod manager;
mod model;
mod season;
mod stats;

use crate::config::Config;
use crate::manager::Manager;
use crate::season::{Clock, FixedClock, Season, SystemClock};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// CSV file with city, timestamp and temperature columns.
    #[arg(long)]
    data: PathBuf,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the annotated dataset and the baseline table.
    Analyze {
        #[arg(long)]
        out_dir: PathBuf,
    },

    /// Judge a live reading against the baseline of its city.
    Evaluate {
        #[arg(long)]
        city: String,

        #[arg(long, allow_negative_numbers = true)]
        temperature: f64,

        /// Defaults to the season of `--date`.
        #[arg(long)]
        season: Option<Season>,

        /// Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print descriptive statistics of a city's temperatures.
    Describe {
        #[arg(long)]
        city: String,

        #[arg(long)]
        season: Option<Season>,

        #[arg(long)]
        year: Option<i32>,
    },

    /// Print the seasonal profile, year range and anomalies of a city.
    Profile {
        #[arg(long)]
        city: String,
    },

    /// Print the cities present in the dataset.
    Cities,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let cfg = match &args.config {
        Some(file) => Config::from_file(file).context("failed to construct cfg")?,
        None => Config::default(),
    };
    log::info!("{cfg:#?}");

    let mgr = Manager::new(&args.data, cfg).context("failed to construct mgr")?;

    match args.command {
        Command::Analyze { out_dir } => mgr.analyze(out_dir)?,
        Command::Evaluate {
            city,
            temperature,
            season,
            date,
        } => {
            let clock: Box<dyn Clock> = match date {
                Some(date) => Box::new(FixedClock(date)),
                None => Box::new(SystemClock),
            };
            mgr.evaluate(&city, temperature, season, clock.as_ref())?
        }
        Command::Describe { city, season, year } => mgr.describe(&city, season, year)?,
        Command::Profile { city } => mgr.profile(&city)?,
        Command::Cities => mgr.cities()?,
    }

    Ok(())
}
