//! Tree indexer: rebuilds the notes index by crawling the journal root.

use crate::domain::{DateKey, NotesIndex};
use crate::infra::{FsError, StorageContext};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::repository::read_day;

/// Depth of day directories below the root.
const DAY_DEPTH: usize = 3;

// ===========================================
// Progress Reporting
// ===========================================

/// Result of processing a single day directory.
#[derive(Debug, Clone)]
pub enum DayResult {
    /// Note was read and added to the index.
    Indexed,
    /// Directory has no note document.
    Skipped,
    /// Error occurred while reading the note.
    Error(String),
}

/// Trait for receiving progress updates during a crawl.
pub trait ProgressReporter {
    /// Called when a day directory is processed.
    fn on_day(&mut self, path: &Path, result: DayResult);
    /// Called when the crawl is complete.
    fn on_complete(&mut self, indexed: usize, errors: usize);
}

/// A no-op progress reporter.
#[derive(Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_day(&mut self, _path: &Path, _result: DayResult) {}
    fn on_complete(&mut self, _indexed: usize, _errors: usize) {}
}

// ===========================================
// Result Types
// ===========================================

/// A day directory that could not be indexed.
#[derive(Debug)]
pub struct CrawlError {
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for CrawlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Result of a full crawl.
#[derive(Debug, Default)]
pub struct CrawlResult {
    /// Every note found.
    pub index: NotesIndex,
    /// Day directories without a note document.
    pub skipped: usize,
    /// Day directories whose note could not be read.
    pub errors: Vec<CrawlError>,
}

// ===========================================
// TreeIndexer
// ===========================================

/// Rebuilds the full [`NotesIndex`] from the `<year>/<month>/<day>` tree.
///
/// Every crawl re-reads every note document and re-resolves every image;
/// nothing is cached between crawls. Problems with a single day are
/// recorded and skipped so one bad directory never aborts the rebuild.
pub struct TreeIndexer<'a> {
    ctx: &'a StorageContext,
}

impl<'a> TreeIndexer<'a> {
    pub fn new(ctx: &'a StorageContext) -> Self {
        Self { ctx }
    }

    /// Crawls the root and returns the rebuilt index.
    ///
    /// Returns an empty index when no folder is connected or access is
    /// denied.
    pub fn crawl(&self) -> NotesIndex {
        self.crawl_with_progress(&mut NoopReporter).index
    }

    /// Crawls the root with progress reporting.
    pub fn crawl_with_progress<P: ProgressReporter>(&self, progress: &mut P) -> CrawlResult {
        let mut result = CrawlResult::default();

        let Some(capability) = self.ctx.capability() else {
            progress.on_complete(0, 0);
            return result;
        };
        if !capability.is_granted() {
            log::warn!(
                "cannot crawl {}: permission denied",
                capability.root().display()
            );
            progress.on_complete(0, 0);
            return result;
        }

        for (key, dir) in day_directories(capability.root()) {
            match read_day(&dir) {
                Ok(note) => {
                    result.index.insert(key, note);
                    progress.on_day(&dir, DayResult::Indexed);
                }
                Err(FsError::NotFound { .. }) => {
                    log::debug!("no note document in {}", dir.display());
                    result.skipped += 1;
                    progress.on_day(&dir, DayResult::Skipped);
                }
                Err(e) => {
                    log::debug!("skipping {}: {}", dir.display(), e);
                    progress.on_day(&dir, DayResult::Error(e.to_string()));
                    result.errors.push(CrawlError {
                        path: dir,
                        message: e.to_string(),
                    });
                }
            }
        }

        progress.on_complete(result.index.len(), result.errors.len());
        result
    }
}

/// Finds every `<year>/<month>/<day>` directory under `root` whose names
/// form a valid date.
fn day_directories(root: &Path) -> impl Iterator<Item = (DateKey, PathBuf)> + '_ {
    journal_entries(root)
        .filter(|entry| entry.depth() == DAY_DEPTH)
        .filter_map(move |entry| {
            let key = date_key_for(root, entry.path());
            if key.is_none() {
                log::debug!("skipping {}: not a calendar date", entry.path().display());
            }
            key.map(|key| (key, entry.into_path()))
        })
}

/// Walks the year, month and day levels below `root`.
///
/// Entries with non-numeric names are pruned at every level and never
/// descended into, so hidden directories and stray files are not visited.
fn journal_entries(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .follow_links(true)
        .max_depth(DAY_DEPTH)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || is_numeric_dir(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.depth() > 0)
}

fn is_numeric_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && parse_segment(entry.file_name()).is_some()
}

/// Parses a plain decimal directory name. Zero-padded names are rejected
/// so that each date maps to exactly one directory.
fn parse_segment(name: &OsStr) -> Option<u32> {
    let name = name.to_str()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = name.parse().ok()?;
    (value.to_string() == name).then_some(value)
}

fn date_key_for(root: &Path, day_dir: &Path) -> Option<DateKey> {
    let relative = day_dir.strip_prefix(root).ok()?;
    let mut parts = relative.iter().map(parse_segment);
    let year = i32::try_from(parts.next()??).ok()?;
    let month = parts.next()??;
    let day = parts.next()??;
    DateKey::from_month_number(year, month, day).ok()
}
