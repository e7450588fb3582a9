//! Batch run: roster + platform exports in, dashboard JSON out
//!
//! Every input is loaded and parsed before anything is written, so a missing
//! or malformed file aborts the run without leaving a partial set of outputs.

use crate::aggregation::{merge_platform_stats, Aggregator};
use crate::error::{IngestError, IngestResult};
use crate::export::{monthly_file_name, ExportOptions, ARTIST_STATS_FILE};
use crate::matching::{ArtistMatcher, OverrideTable};
use crate::pipeline::{Pipeline, RunSummary};
use crate::records::{load_rows, mappers_from_config};
use crate::roster::Roster;
use fanpulse_common::config::TomlConfig;
use fanpulse_common::Platform;
use std::path::PathBuf;
use tracing::info;

/// Input and output locations for one run
#[derive(Debug, Clone)]
pub struct BatchInputs {
    pub roster: PathBuf,
    /// Export file per platform; platforms without one are skipped
    pub datasets: Vec<(Platform, PathBuf)>,
    pub output_dir: PathBuf,
}

/// Result of one platform within a batch
#[derive(Debug, Clone)]
pub struct PlatformOutcome {
    pub platform: Platform,
    pub summary: RunSummary,
    pub months: usize,
    pub output: PathBuf,
}

/// Result of a whole batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub roster_size: usize,
    pub platforms: Vec<PlatformOutcome>,
    pub artists: usize,
    pub artist_stats: PathBuf,
}

/// Fail fast on anything that would abort the run halfway
fn check_inputs(inputs: &BatchInputs) -> IngestResult<()> {
    if inputs.datasets.is_empty() {
        return Err(IngestError::NoDatasets);
    }
    for (platform, path) in &inputs.datasets {
        if !path.is_file() {
            return Err(IngestError::MissingDataset {
                platform: *platform,
                path: path.clone(),
            });
        }
    }
    Ok(())
}

/// Run the full pipeline.
///
/// # Arguments
/// * `inputs` - Roster, platform exports and output folder
/// * `config` - Loaded configuration
/// * `jobs` - Classification threads; `None` uses all cores
///
/// # Errors
/// Aborts on a missing or empty roster, a missing or malformed dataset, or a
/// failed write. Bad individual records never abort.
pub fn run_batch(inputs: &BatchInputs, config: &TomlConfig, jobs: Option<usize>) -> IngestResult<BatchReport> {
    check_inputs(inputs)?;

    let roster = Roster::load(&inputs.roster)?;
    let roster_size = roster.len();

    let matcher = ArtistMatcher::from_config(roster, OverrideTable::builtin(), &config.matching);
    let pipeline = Pipeline::new(matcher)
        .with_mappers(mappers_from_config(config)?)
        .with_jobs(jobs);
    let aggregator = Aggregator::new(config.matching.median_rule);
    let options = ExportOptions::from(&config.output);

    // Every dataset must parse before the first output is written
    let mut loaded = Vec::with_capacity(inputs.datasets.len());
    for (platform, path) in &inputs.datasets {
        loaded.push((*platform, load_rows(path, *platform)?));
    }

    let mut documents = Vec::with_capacity(loaded.len());
    let mut per_platform = Vec::with_capacity(loaded.len());

    for (platform, rows) in &loaded {
        let platform = *platform;
        info!(platform = %platform, rows = rows.len(), "Processing dataset");

        let run = pipeline.run_platform(rows, platform);
        let months = aggregator.by_month(&run.posts);
        let document = options.monthly_document(&months);

        per_platform.push((platform, aggregator.by_artist(&run.posts, platform)));
        documents.push((platform, run.summary, document));
    }

    let mut outcomes = Vec::with_capacity(documents.len());
    for (platform, summary, document) in documents {
        let output = options.write_json(&inputs.output_dir, &monthly_file_name(platform), &document)?;
        info!(
            platform = %platform,
            posts = summary.total_rows,
            months = document.len(),
            "Wrote monthly data"
        );
        outcomes.push(PlatformOutcome {
            platform,
            summary,
            months: document.len(),
            output,
        });
    }

    let merged = merge_platform_stats(per_platform);
    let artist_stats = options.write_json(
        &inputs.output_dir,
        ARTIST_STATS_FILE,
        &options.artist_document(&merged),
    )?;
    info!(artists = merged.len(), "Wrote artist statistics");

    Ok(BatchReport {
        roster_size,
        platforms: outcomes,
        artists: merged.len(),
        artist_stats,
    })
}
