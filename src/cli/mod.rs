//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::domain::DateKey;
use output::OutputFormat;

/// chronicle - a journal with one note per day, stored as plain folders
#[derive(Parser, Debug)]
#[command(name = "chronicle", version, about, long_about = None)]
pub struct Cli {
    /// Journal folder for this invocation (not persisted)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Select the journal folder and remember it
    Connect(ConnectArgs),

    /// Show the connected folder and its permission state
    Status,

    /// Re-grant access to the remembered folder
    Grant(GrantArgs),

    /// Write a day's note from a file or stdin
    Write(WriteArgs),

    /// Edit a day's note in your editor
    Edit(EditArgs),

    /// Show a day's note
    Show(ShowArgs),

    /// List all notes, most recent first
    Archive(ArchiveArgs),

    /// Show a month with the days that have notes
    Calendar(CalendarArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `connect` command
#[derive(Parser, Debug)]
pub struct ConnectArgs {
    /// Folder to store the journal in
    pub dir: PathBuf,
}

/// Arguments for the `grant` command
#[derive(Parser, Debug)]
pub struct GrantArgs {
    /// Answer yes to the permission prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `write` command
#[derive(Parser, Debug)]
pub struct WriteArgs {
    /// Day to write (YYYY-MM-DD or "today")
    pub date: DateKey,

    /// Read markup from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Attach an image (can be specified multiple times)
    #[arg(short, long = "attach", action = ArgAction::Append)]
    pub attachments: Vec<PathBuf>,
}

/// Arguments for the `edit` command
#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Day to edit (YYYY-MM-DD or "today")
    #[arg(default_value = "today")]
    pub date: DateKey,
}

/// Arguments for the `show` command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Day to show (YYYY-MM-DD or "today")
    #[arg(default_value = "today")]
    pub date: DateKey,

    /// Print the markup as stored, without resolving images
    #[arg(long)]
    pub portable: bool,
}

/// Arguments for the `archive` command
#[derive(Parser, Debug)]
pub struct ArchiveArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Include notes with no visible content
    #[arg(short, long)]
    pub all: bool,

    /// Maximum preview length in characters
    #[arg(long, default_value_t = 60)]
    pub width: usize,
}

/// Arguments for the `calendar` command
#[derive(Parser, Debug)]
pub struct CalendarArgs {
    /// Year (defaults to the current year)
    pub year: Option<i32>,

    /// Month, 1-12 (defaults to the current month)
    #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
