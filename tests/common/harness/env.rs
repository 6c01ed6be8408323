//! Isolated test environment with temp directories.

#![allow(dead_code)]

use super::{ChronicleCommand, TestDay};
use chronicle::domain::NotesIndex;
use chronicle::infra::{RootCapability, StorageContext};
use chronicle::store::TreeIndexer;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with a temporary journal folder.
///
/// Holds two temp directories: the journal itself and a separate one for
/// the capability state file, so the journal crawl never sees state files.
pub struct TestEnv {
    _journal: TempDir,
    _state: TempDir,
    journal_dir: PathBuf,
    state_file: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment.
    pub fn new() -> Self {
        let journal = TempDir::new().expect("Failed to create journal directory");
        let state = TempDir::new().expect("Failed to create state directory");
        let journal_dir = journal
            .path()
            .canonicalize()
            .expect("Failed to canonicalize journal directory");
        let state_file = state.path().join("root.json");
        Self {
            _journal: journal,
            _state: state,
            journal_dir,
            state_file,
        }
    }

    /// Returns the path to the journal folder.
    pub fn journal_dir(&self) -> &Path {
        &self.journal_dir
    }

    /// Returns the path of the capability state file.
    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    /// Returns the day directory for `YYYY-MM-DD` (month 1-based on disk).
    pub fn day_dir(&self, date: &str) -> PathBuf {
        let key: chronicle::domain::DateKey = date.parse().expect("invalid test date");
        self.journal_dir
            .join(key.year().to_string())
            .join(key.month_number().to_string())
            .join(key.day().to_string())
    }

    /// Writes a day directory directly to disk and returns its path.
    pub fn add_day(&self, day: &TestDay) -> PathBuf {
        let dir = self.day_dir(day.date());
        std::fs::create_dir_all(&dir).expect("Failed to create day directory");
        std::fs::write(dir.join("index.html"), day.get_content()).expect("Failed to write note");
        for (name, bytes) in day.files() {
            std::fs::write(dir.join(name), bytes).expect("Failed to write attachment");
        }
        dir
    }

    /// Returns a storage context rooted at the journal folder.
    pub fn context(&self) -> StorageContext {
        let capability =
            RootCapability::new(&self.journal_dir).expect("Failed to open journal folder");
        StorageContext::with_root(capability)
    }

    /// Crawls the journal folder through the library.
    pub fn crawl(&self) -> NotesIndex {
        TreeIndexer::new(&self.context()).crawl()
    }

    /// Creates a ChronicleCommand with `--dir` set to the journal folder.
    pub fn cmd(&self) -> ChronicleCommand {
        self.bare_cmd().dir(&self.journal_dir)
    }

    /// Creates a ChronicleCommand that relies on the connected folder.
    pub fn bare_cmd(&self) -> ChronicleCommand {
        ChronicleCommand::new().state_file(&self.state_file)
    }

    /// Writes a file outside the journal folder and returns its path.
    pub fn write_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self
            .state_file
            .parent()
            .expect("state file has a parent")
            .join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
