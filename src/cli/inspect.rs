//! Snapshot inspection command implementation.

use super::CliError;
use super::output::{format_summary, render_map};
use frontier::{GameState, Snapshot, SnapshotError};
use std::path::PathBuf;

/// Execute the inspect command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or violates a game invariant.
pub(crate) fn execute(snapshot: PathBuf, show_map: bool) -> Result<(), CliError> {
    let saved = Snapshot::load(&snapshot).map_err(|e| {
        CliError::new(format!("Failed to read {}: {e}", snapshot.display()))
    })?;

    println!("Inspecting: {}", snapshot.display());
    println!();

    let game = match GameState::restore(saved) {
        Ok(game) => {
            print_check("Invariants", true);
            game
        }
        Err(SnapshotError::Invalid(reason)) => {
            print_check("Invariants", false);
            for violation in reason.split("; ") {
                println!("    - {violation}");
            }
            return Err(CliError::new("Snapshot is not a valid game"));
        }
        Err(e) => return Err(e.into()),
    };

    println!();
    print!("{}", format_summary(&game));
    if show_map {
        println!();
        print!("{}", render_map(&game));
    }

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
