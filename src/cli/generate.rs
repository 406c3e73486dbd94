//! Generate command implementation.

use super::output::{format_summary, render_map};
use super::{CliError, OutputFormat, load_config};
use frontier::GameState;
use std::path::PathBuf;

/// Execute the generate command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the snapshot cannot
/// be written.
pub(crate) fn execute(
    config: Option<PathBuf>,
    seed: Option<u64>,
    width: Option<u16>,
    height: Option<u16>,
    save: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut config = load_config(config.as_deref())?;
    if seed.is_some() {
        config.map.seed = seed;
    }
    if let Some(width) = width {
        config.map.width = width;
    }
    if let Some(height) = height {
        config.map.height = height;
    }

    let game = GameState::new_game(&config)?;

    if let Some(save_path) = &save {
        game.save(save_path).map_err(|e| {
            CliError::new(format!("Failed to save snapshot: {e}"))
        })?;
    }

    match format {
        OutputFormat::Text => {
            print!("{}", format_summary(&game));
            println!();
            print!("{}", render_map(&game));
            if let Some(save_path) = &save {
                println!();
                println!("Snapshot saved to: {}", save_path.display());
            }
        }
        OutputFormat::Json => {
            let json = game
                .snapshot()
                .to_json()
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
