//! Write and Edit command handlers.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::actionable;
use crate::cli::config::Config;
use crate::cli::{EditArgs, WriteArgs};
use crate::domain::Attachment;
use crate::infra::StorageContext;
use crate::store::NoteRepository;

pub fn handle_write(args: &WriteArgs, ctx: &StorageContext) -> Result<()> {
    let markup = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read note from stdin")?;
            buf
        }
    };

    let attachments = stamp_attachments(&args.attachments, Utc::now())?;

    let saved = NoteRepository::new(ctx)
        .save(&args.date, &markup, &attachments)
        .map_err(actionable)?;

    println!("Saved {}: {}", args.date, saved.path.display());
    for attachment in &attachments {
        println!("  attached: {}", attachment.name());
    }
    Ok(())
}

/// Reads and names the attachments of one write.
///
/// All attachments share one timestamp, so files with the same base name
/// get a counter (`img_<millis>_2_photo.jpg`) to keep every name distinct.
pub(crate) fn stamp_attachments(paths: &[PathBuf], now: DateTime<Utc>) -> Result<Vec<Attachment>> {
    let mut taken = HashSet::new();
    let mut attachments = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("attachment has no usable file name: {}", path.display()))?;

        let mut attachment = Attachment::stamped(name, bytes, now);
        let mut counter = 2;
        while taken.contains(attachment.name()) {
            let bytes = attachment.bytes().to_vec();
            attachment = Attachment::stamped(&format!("{}_{}", counter, name), bytes, now);
            counter += 1;
        }
        taken.insert(attachment.name().to_string());
        attachments.push(attachment.with_live_ref(path.to_string_lossy()));
    }
    Ok(attachments)
}

/// Trait for launching an editor (allows mocking in tests).
pub(crate) trait EditorLauncher {
    fn open(&self, path: &Path) -> Result<()>;
}

/// Internal implementation that accepts a generic editor launcher.
///
/// The stored markup is copied to a scratch file, edited there, and saved
/// back only if it changed.
pub(crate) fn handle_edit_impl<E: EditorLauncher>(
    args: &EditArgs,
    ctx: &StorageContext,
    editor: &E,
) -> Result<bool> {
    let repo = NoteRepository::new(ctx);
    if ctx.capability().is_none() {
        bail!("no journal folder connected; run `chronicle connect <DIR>`");
    }

    let original = repo
        .get_portable(&args.date)
        .map(|note| note.content().to_string())
        .unwrap_or_default();

    let scratch = tempfile::Builder::new()
        .prefix("chronicle-")
        .suffix(".html")
        .tempfile()
        .context("failed to create scratch file")?;
    std::fs::write(scratch.path(), &original).context("failed to write scratch file")?;

    editor.open(scratch.path())?;

    let edited = std::fs::read_to_string(scratch.path()).context("failed to read edited note")?;
    if edited == original {
        println!("No changes to {}", args.date);
        return Ok(false);
    }

    let saved = repo.save(&args.date, &edited, &[]).map_err(actionable)?;
    println!("Saved {}: {}", args.date, saved.path.display());
    Ok(true)
}

pub fn handle_edit(args: &EditArgs, ctx: &StorageContext, config: &Config) -> Result<()> {
    struct RealEditor<'a>(&'a Config);
    impl EditorLauncher for RealEditor<'_> {
        fn open(&self, path: &Path) -> Result<()> {
            open_in_editor(path, self.0)
        }
    }
    handle_edit_impl(args, ctx, &RealEditor(config)).map(|_| ())
}

fn open_in_editor(path: &Path, config: &Config) -> Result<()> {
    let editor = config.editor();

    // Parse editor command (may include args like "code --wait")
    let mut parts = editor.split_whitespace();
    let Some(cmd) = parts.next() else {
        bail!("editor command is empty");
    };

    let status = Command::new(cmd)
        .args(parts)
        .arg(path)
        .status()
        .with_context(|| format!("failed to launch editor '{}'", editor))?;

    if !status.success() {
        bail!("editor '{}' exited with non-zero status", editor);
    }

    Ok(())
}
