//! Tune command implementation.
//!
//! Generates many maps from one configuration and reports how closely the
//! terrain mix tracks the configured ratios.

use super::output::{JsonTuneResult, TuneStats, format_tune_text};
use super::{CliError, OutputFormat, load_config};
use frontier::game::{TerrainCounts, generate_map};
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;

/// Execute the tune command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub(crate) fn execute(
    config: Option<PathBuf>,
    maps: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    progress: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    config.validate()?;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = seed
        .or(config.map.seed)
        .unwrap_or_else(|| rand::rng().random());

    let pb = if progress {
        let pb = ProgressBar::new(maps);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} maps ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each thread folds into its own stats; the partial results are merged at the end
    let stats = (0..maps)
        .into_par_iter()
        .fold(TuneStats::default, |mut local_stats, i| {
            let mut map_config = config.map;
            map_config.seed = Some(base_seed.wrapping_add(i));
            if let Some((map, _)) = generate_map(&map_config) {
                local_stats.add(&TerrainCounts::of(&map));
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local_stats
        })
        .reduce(TuneStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();

    match format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_tune_text(&stats, base_seed));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let json_result = JsonTuneResult::from_stats(&stats, base_seed);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
