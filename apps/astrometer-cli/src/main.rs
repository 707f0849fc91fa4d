mod calibrate;
mod dataset;

use anyhow::Context;
use astrometer::meters::{calculate_all_meters, calculate_groups, calculate_meter, AllMetersReading, GroupReading};
use astrometer::normalization::{CalibrationCache, NormalizationMode};
use astrometer::MeterId;
use astrometer_config::AstrometerConfig;
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Normalization {
    Percentile,
    Sigmoid,
}

impl From<Normalization> for NormalizationMode {
    fn from(n: Normalization) -> Self {
        match n {
            Normalization::Percentile => NormalizationMode::Percentile,
            Normalization::Sigmoid => NormalizationMode::Sigmoid,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (default: configs/astrometer.toml, searched from the working directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Calibration file override.
    #[arg(long, global = true)]
    calibration: Option<PathBuf>,

    /// Normalization override.
    #[arg(long, global = true, value_enum)]
    normalization: Option<Normalization>,

    /// Disable the seeded background dither.
    #[arg(long, global = true)]
    no_dither: bool,

    /// Write JSON here instead of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score all 23 meters (plus groups) for one natal chart on one day.
    Score {
        #[arg(long)]
        natal: PathBuf,
        #[arg(long)]
        transit: PathBuf,
        /// Transit chart for the day before; enables trends.
        #[arg(long)]
        yesterday: Option<PathBuf>,
        /// Date of the transit chart (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
    },
    /// Score a single meter.
    Meter {
        /// Meter id, e.g. mental_clarity.
        #[arg(long)]
        name: String,
        #[arg(long)]
        natal: PathBuf,
        #[arg(long)]
        transit: PathBuf,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Build a calibration file from natal charts and dated transit charts.
    Calibrate {
        /// Natal chart JSON file or directory of them.
        #[arg(long)]
        natals: PathBuf,
        /// Directory of transit charts named YYYY-MM-DD.json.
        #[arg(long)]
        transits: PathBuf,
        /// Keep raw samples in the tables for percentile ranking.
        #[arg(long)]
        history: bool,
    },
}

#[derive(Serialize)]
struct ScoreOutput {
    #[serde(flatten)]
    reading: AllMetersReading,
    groups: Vec<GroupReading>,
}

fn resolve_config(args: &Args) -> anyhow::Result<AstrometerConfig> {
    let mut config = match &args.config {
        Some(path) => astrometer_config::load_config_from(path)?,
        None => match astrometer_config::load_config() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using built-in defaults");
                AstrometerConfig {
                    calibration_path: Path::new("configs").join(astrometer_config::DEFAULT_CALIBRATION_FILE),
                    engine: Default::default(),
                }
            }
        },
    };
    if let Some(path) = &args.calibration {
        config.calibration_path = path.clone();
    }
    if let Some(mode) = args.normalization {
        config.engine.normalization = mode.into();
    }
    if args.no_dither {
        config.engine.dither = false;
    }
    Ok(config)
}

fn emit<T: Serialize>(value: &T, out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => fs::write(path, json).with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = resolve_config(&args)?;
    let settings = &config.engine;

    match &args.command {
        Command::Score { natal, transit, yesterday, date } => {
            astrometer_config::validate_calibration_path(&config)?;
            let store = CalibrationCache::new(&config.calibration_path).get()?;
            let natal = dataset::read_chart(natal)?;

            let previous = match yesterday {
                Some(path) => {
                    let chart = dataset::read_chart(path)?;
                    let day_before = *date - Duration::days(1);
                    Some(calculate_all_meters(&natal, &chart, day_before, &store, settings, None)?)
                }
                None => None,
            };
            let reading = calculate_all_meters(
                &natal,
                &dataset::read_chart(transit)?,
                *date,
                &store,
                settings,
                previous.as_ref(),
            )?;
            let groups = calculate_groups(&reading, &store.trend_thresholds(settings.trend));
            emit(&ScoreOutput { reading, groups }, args.out.as_deref())
        }
        Command::Meter { name, natal, transit, date } => {
            let meter: MeterId = name.parse()?;
            astrometer_config::validate_calibration_path(&config)?;
            let store = CalibrationCache::new(&config.calibration_path).get()?;
            let reading = calculate_meter(
                meter,
                &dataset::read_chart(natal)?,
                &dataset::read_chart(transit)?,
                *date,
                &store,
                settings,
            )?;
            emit(&reading, args.out.as_deref())
        }
        Command::Calibrate { natals, transits, history } => {
            let natal_charts = dataset::json_files(natals)?
                .iter()
                .map(|p| dataset::read_chart(p))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let transit_charts = dataset::dated_transits(transits)?;
            eprintln!(
                "[astrometer] calibrating from {} natal charts x {} transit days",
                natal_charts.len(),
                transit_charts.len()
            );

            let store = calibrate::build_calibration(&natal_charts, &transit_charts, settings, *history)?;
            let out = args.out.clone().unwrap_or_else(|| config.calibration_path.clone());
            store.save(&out)?;
            eprintln!("[astrometer] calibration -> {}", out.display());
            Ok(())
        }
    }
}
