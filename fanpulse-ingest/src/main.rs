//! fanpulse-ingest - Artist attribution batch
//!
//! Reads a roster and TikTok/Instagram exports, attributes every post to a
//! roster artist and writes the dashboard documents:
//! - `data_tiktok.json` / `data_instagram.json`: monthly aggregates
//! - `artist_stats.json`: per-artist statistics across platforms

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use fanpulse_common::config::{load_config, resolve_root_folder, LoggingConfig};
use fanpulse_common::Platform;
use fanpulse_ingest::batch::{run_batch, BatchInputs};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for fanpulse-ingest
#[derive(Parser, Debug)]
#[command(name = "fanpulse-ingest")]
#[command(about = "Attribute social posts to roster artists and export engagement statistics")]
#[command(version)]
struct Args {
    /// Roster file, one artist per line
    #[arg(short, long, env = "FANPULSE_ROSTER")]
    roster: PathBuf,

    /// TikTok export (JSON array of rows)
    #[arg(long, env = "FANPULSE_TIKTOK")]
    tiktok: Option<PathBuf>,

    /// Instagram export (JSON array of rows)
    #[arg(long, env = "FANPULSE_INSTAGRAM")]
    instagram: Option<PathBuf>,

    /// Output folder (falls back to FANPULSE_ROOT_FOLDER, then config, then default)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Config file (falls back to FANPULSE_CONFIG, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fuzzy-match acceptance threshold in [0, 1]
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Classification threads (default: all cores)
    #[arg(short, long)]
    jobs: Option<usize>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fanpulse_ingest={0},fanpulse_common={0}",
            logging.level
        ))
    });

    let (stderr_layer, file_layer) = match &logging.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            (
                None,
                Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
            )
        }
        None => (Some(fmt::layer().with_writer(std::io::stderr)), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // config source is logged after init_tracing
    let (mut config, config_source) =
        load_config(args.config.as_deref()).context("Failed to load config")?;
    if let Some(threshold) = args.threshold {
        config.matching.threshold = threshold;
    }
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.logging)?;

    info!("Starting fanpulse-ingest");
    config_source.log();
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let output_dir = resolve_root_folder(args.output_dir.as_deref(), &config);
    info!("Output folder: {}", output_dir.display());
    info!(
        threshold = config.matching.threshold,
        override_policy = ?config.matching.override_policy,
        median_rule = ?config.matching.median_rule,
        "Matching settings"
    );

    let datasets: Vec<(Platform, PathBuf)> = [
        (Platform::TikTok, args.tiktok),
        (Platform::Instagram, args.instagram),
    ]
    .into_iter()
    .filter_map(|(platform, path)| path.map(|p| (platform, p)))
    .collect();

    let inputs = BatchInputs {
        roster: args.roster,
        datasets,
        output_dir,
    };

    let report = run_batch(&inputs, &config, args.jobs).context("Batch run failed")?;

    for outcome in &report.platforms {
        info!(
            platform = %outcome.platform,
            attributed = outcome.summary.attributed,
            unattributed = outcome.summary.unattributed,
            corrected = outcome.summary.corrected,
            missing_date = outcome.summary.missing_date,
            malformed_numeric = outcome.summary.malformed_numeric,
            months = outcome.months,
            "Wrote {}",
            outcome.output.display()
        );
    }
    info!(
        artists = report.artists,
        roster = report.roster_size,
        "Wrote {}",
        report.artist_stats.display()
    );

    Ok(())
}
