//! Command handlers for the CLI.

mod archive;
mod calendar;
mod connect;
mod show;
mod write;


use anyhow::{Context, Result, anyhow};
use std::path::Path;

use crate::cli::config::Config;
use crate::infra::{CapabilityStore, RootCapability, StorageContext};
use crate::store::{DayResult, ProgressReporter, StoreError, UserAction};

// Re-export public items
pub use archive::handle_archive;
pub use calendar::{handle_calendar, render_month};
pub use connect::{handle_connect, handle_grant, handle_status};
pub use show::handle_show;
pub use write::{handle_edit, handle_write};

// Re-export for tests
#[cfg(test)]
pub(crate) use write::{EditorLauncher, handle_edit_impl, stamp_attachments};

// ===========================================
// Shared Utilities
// ===========================================

/// Progress reporter that prints to stdout.
pub(crate) struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub(crate) fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_day(&mut self, path: &Path, result: DayResult) {
        if self.verbose {
            match result {
                DayResult::Indexed => println!("  indexed: {}", path.display()),
                DayResult::Skipped => println!("  skipped: {}", path.display()),
                DayResult::Error(msg) => eprintln!("  error: {}: {}", path.display(), msg),
            }
        }
    }

    fn on_complete(&mut self, indexed: usize, errors: usize) {
        if errors > 0 {
            eprintln!("Found {} notes with {} errors", indexed, errors);
        } else if self.verbose {
            println!("Found {} notes", indexed);
        }
    }
}

/// Builds the storage context for a command.
///
/// Precedence order:
/// 1. CLI `--dir` argument (not remembered)
/// 2. Connected folder from the capability store
/// 3. Config file `dir` setting
pub(crate) fn storage_context(
    cli_dir: Option<&Path>,
    config: &Config,
    store: &mut CapabilityStore,
) -> Result<StorageContext> {
    if let Some(dir) = cli_dir {
        let capability = RootCapability::new(dir)
            .with_context(|| format!("cannot open journal folder {}", dir.display()))?;
        return Ok(StorageContext::with_root(capability));
    }

    if let Some(capability) = store.load() {
        return Ok(StorageContext::with_root(capability));
    }

    if let Some(dir) = &config.dir {
        let capability = RootCapability::new(dir)
            .with_context(|| format!("cannot open configured journal folder {}", dir.display()))?;
        return Ok(StorageContext::with_root(capability));
    }

    Ok(StorageContext::detached())
}

/// Converts a store error into a message telling the user what to do.
pub(crate) fn actionable(err: StoreError) -> anyhow::Error {
    match err.user_action() {
        Some(UserAction::ReconnectFolder) => {
            anyhow!("{}; run `chronicle connect <DIR>` to reconnect a folder", err)
        }
        Some(UserAction::GrantPermission) => {
            anyhow!("{}; run `chronicle grant` to restore access", err)
        }
        None => anyhow::Error::new(err).context("failed to save note"),
    }
}

/// Truncates a string to a maximum display width, adding ellipsis if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
