//! Fluent wrapper around assert_cmd::Command.

// Allow dead code since this is a test utility with methods for future tests
#![allow(dead_code)]

use assert_cmd::Command;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Fluent wrapper around `assert_cmd::Command` for the `chronicle` binary.
///
/// Every command gets its own capability state file so tests never touch
/// the user's remembered journal folder.
pub struct ChronicleCommand {
    args: Vec<String>,
    state_file: Option<PathBuf>,
    stdin: Option<String>,
}

impl ChronicleCommand {
    /// Creates a new command for the `chronicle` binary.
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            state_file: None,
            stdin: None,
        }
    }

    /// Sets the `--dir` option to specify the journal folder.
    pub fn dir(mut self, path: &Path) -> Self {
        self.args.push("--dir".to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Points the capability store at `path`.
    pub fn state_file(mut self, path: &Path) -> Self {
        self.state_file = Some(path.to_path_buf());
        self
    }

    /// Feeds `input` to the command's stdin.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Adds arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Returns the current arguments (for testing).
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command and returns an Assert for making assertions.
    #[allow(deprecated)]
    pub fn assert(self) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("chronicle").expect("Failed to find chronicle binary");
        cmd.args(&self.args);
        cmd.env_remove("RUST_LOG");
        match &self.state_file {
            Some(path) => {
                cmd.env("CHRONICLE_STATE_FILE", path);
                if let Some(parent) = path.parent() {
                    cmd.env("XDG_CONFIG_HOME", parent);
                }
            }
            None => {
                cmd.env("CHRONICLE_STATE_FILE", "/nonexistent/chronicle/root.json");
            }
        }
        cmd.write_stdin(self.stdin.unwrap_or_default());
        cmd.assert()
    }

    /// Runs the command, expects success, and returns stdout as a string.
    pub fn output_success(self) -> String {
        let output = self.assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output was not valid UTF-8")
    }

    /// Runs the command, expects success, and parses stdout as JSON.
    pub fn output_json<T: DeserializeOwned>(self) -> T {
        let output = self.output_success();
        serde_json::from_str(&output).expect("Failed to parse output as JSON")
    }

    // ===========================================
    // Command Shortcuts
    // ===========================================

    /// Configures for the `connect` command.
    pub fn connect(self, dir: &Path) -> Self {
        let dir = dir.to_string_lossy().to_string();
        self.args(["connect", dir.as_str()])
    }

    /// Configures for the `write` command with a date.
    pub fn write(self, date: &str) -> Self {
        self.args(["write", date])
    }

    /// Configures for the `show` command with a date.
    pub fn show(self, date: &str) -> Self {
        self.args(["show", date])
    }

    /// Configures for the `archive` command.
    pub fn archive(self) -> Self {
        self.args(["archive"])
    }

    /// Configures for the `calendar` command.
    pub fn calendar(self, year: i32, month: u32) -> Self {
        self.args(["calendar".to_string(), year.to_string(), month.to_string()])
    }

    /// Adds `--format json` to the command.
    pub fn format_json(self) -> Self {
        self.args(["--format", "json"])
    }
}

impl Default for ChronicleCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_runs_binary() {
        ChronicleCommand::new().args(["--help"]).assert().success();
    }

    #[test]
    fn test_command_with_dir() {
        let temp = TempDir::new().unwrap();
        let cmd = ChronicleCommand::new().dir(temp.path());
        let args = cmd.get_args();
        assert_eq!(args[0], "--dir");
        assert_eq!(args[1], temp.path().to_string_lossy());
    }

    #[test]
    fn test_command_shortcuts() {
        let cmd = ChronicleCommand::new().archive().format_json();
        let args = cmd.get_args();
        assert!(args.contains(&"archive".to_string()));
        assert!(args.contains(&"json".to_string()));
    }
}
