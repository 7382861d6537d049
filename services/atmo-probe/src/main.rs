//! Atmosphere probe.
//!
//! Loads atmosphere configs the same way the host does at startup and
//! prints what the query facade returns for a point or a vertical profile.

mod report;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use atmo_common::Vector3;
use atmo_store::{
    load_config_dir, load_config_file, AtmosphereRegistry, BodyProfile, ExponentialAtmosphere,
    FacadeSettings, QueryFacade, WindVariability,
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use report::{profile_altitudes, sample_point, usable, Probe};

#[derive(Parser, Debug)]
#[command(name = "atmo-probe")]
#[command(about = "Query gridded atmosphere data from the command line")]
struct Args {
    /// Config file, or a directory scanned recursively for *.yaml / *.yml
    #[arg(short, long, env = "ATMO_CONFIG")]
    config: PathBuf,

    /// Stock atmosphere profiles (YAML `bodies:` map)
    #[arg(long, env = "ATMO_STOCK")]
    stock: Option<PathBuf>,

    /// Body to query
    #[arg(short, long, default_value = "Kerbin")]
    body: String,

    /// Longitude in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lon: f64,

    /// Latitude in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lat: f64,

    /// Altitude in meters
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    alt: f64,

    /// Universal time in seconds
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    time: f64,

    /// Print a vertical profile from 0 up to this altitude instead of one point
    #[arg(long)]
    profile_top: Option<f64>,

    /// Altitude step of the profile in meters
    #[arg(long, default_value_t = 1000.0)]
    profile_step: f64,

    /// List loaded bodies and datasets, then exit
    #[arg(long)]
    list: bool,

    /// Apply seeded wind gusts to sampled wind
    #[arg(long)]
    seed: Option<u64>,

    /// Relative gust strength on the horizontal axes
    #[arg(long, default_value_t = 0.1)]
    gust_amplitude: f64,

    /// Seconds between gust targets
    #[arg(long, default_value_t = 60.0)]
    gust_interval: f64,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(config = %args.config.display(), "Starting atmosphere probe");

    let stock = match &args.stock {
        Some(path) => ExponentialAtmosphere::from_file(path)
            .with_context(|| format!("failed to load stock profiles from {}", path.display()))?,
        None => ExponentialAtmosphere::new().with_body(args.body.clone(), BodyProfile::default()),
    };

    let mut registry = AtmosphereRegistry::new();
    let report = if args.config.is_dir() {
        load_config_dir(&args.config, &mut registry, &stock)?
    } else {
        load_config_file(&args.config, &mut registry, &stock)
            .with_context(|| format!("failed to load {}", args.config.display()))?
    };
    if report.skipped > 0 || report.failed_files > 0 {
        warn!(
            skipped = report.skipped,
            failed_files = report.failed_files,
            "Some config entries were not loaded"
        );
    }

    if args.list {
        let summaries = registry.summaries();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let settings = FacadeSettings::from_env();
    if let Err(e) = settings.validate() {
        bail!("invalid facade settings: {e}");
    }
    if registry.get(&args.body).is_none() {
        warn!(body = %args.body, "No atmosphere data loaded for body");
    }
    let facade = QueryFacade::new(registry, stock).with_settings(settings);

    let mut gusts = args.seed.map(|seed| {
        let amplitude = Vector3::new(args.gust_amplitude, args.gust_amplitude, 0.0);
        WindVariability::new(seed, amplitude, args.gust_interval)
    });

    let probe = Probe {
        body: &args.body,
        lon: args.lon,
        lat: args.lat,
        alt: args.alt,
        time: args.time,
    };

    match args.profile_top {
        Some(top) => {
            let altitudes = profile_altitudes(top, args.profile_step);
            if altitudes.is_empty() {
                bail!("profile needs a top >= 0 and a step > 0");
            }
            let reports: Vec<_> = altitudes
                .into_iter()
                .map(|alt| sample_point(&facade, &probe.at_altitude(alt), gusts.as_mut()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        None => {
            let point = sample_point(&facade, &probe, gusts.as_mut());
            info!(usable = usable(&point), "Sampled point");
            println!("{}", serde_json::to_string_pretty(&point)?);
        }
    }

    Ok(())
}
