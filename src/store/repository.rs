//! Single-day note persistence.

use crate::domain::{Attachment, DateKey, DayNote};
use crate::infra::{
    AssetCodec, FsError, NOTE_FILE_NAME, RootCapability, StorageContext, path_for, portable_name,
    read_text, resolve_directory, write_atomic,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What the editor produces for an empty document.
const EMPTY_EDITOR_MARKUP: &str = "<p><br></p>";

/// Errors from note writes. Reads never fail; they return `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no journal folder connected")]
    CapabilityMissing,

    #[error("permission denied for journal folder: {root}")]
    PermissionDenied { root: PathBuf },

    #[error("invalid attachment name: {name:?}")]
    InvalidAttachmentName { name: String },

    #[error("save incomplete, {written} of {total} files written: {source}")]
    PartialWrite {
        written: usize,
        total: usize,
        #[source]
        source: FsError,
    },

    #[error(transparent)]
    Fs(#[from] FsError),
}

/// The action a user can take to recover from a store error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    ReconnectFolder,
    GrantPermission,
}

impl StoreError {
    /// Returns the action the user should take, if the error is one the
    /// user can fix.
    pub fn user_action(&self) -> Option<UserAction> {
        match self {
            StoreError::CapabilityMissing => Some(UserAction::ReconnectFolder),
            StoreError::PermissionDenied { .. } => Some(UserAction::GrantPermission),
            _ => None,
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedNote {
    /// The day directory.
    pub dir: PathBuf,
    /// Path of the note document.
    pub path: PathBuf,
    /// The portable markup that was written.
    pub content: String,
    /// Attachment files written.
    pub attachments: usize,
}

/// Reads and writes one day's note under the context's root.
pub struct NoteRepository<'a> {
    ctx: &'a StorageContext,
}

impl<'a> NoteRepository<'a> {
    pub fn new(ctx: &'a StorageContext) -> Self {
        Self { ctx }
    }

    /// Saves a day's note and its new attachments.
    ///
    /// The markup is converted to portable form first. Attachments are
    /// written before the note document so every file the document refers
    /// to is durable by the time the document is. Each file is replaced
    /// atomically, but there is no rollback across files: a failure part way
    /// through leaves earlier attachments in place and is reported as
    /// [`StoreError::PartialWrite`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CapabilityMissing` if no folder is connected and
    /// `StoreError::PermissionDenied` if access was revoked; in both cases
    /// nothing is written.
    pub fn save(
        &self,
        key: &DateKey,
        markup: &str,
        attachments: &[Attachment],
    ) -> Result<SavedNote, StoreError> {
        let capability = self.writable_capability()?;

        for attachment in attachments {
            if portable_name(attachment.name()).is_none() || attachment.name() == NOTE_FILE_NAME {
                return Err(StoreError::InvalidAttachmentName {
                    name: attachment.name().to_string(),
                });
            }
        }

        let dir = resolve_directory(Some(capability), &path_for(key), true)?
            .ok_or(StoreError::CapabilityMissing)?;

        let codec = AssetCodec::new(&dir);
        let mut content = codec.to_portable(markup, attachments);
        if content.trim() == EMPTY_EDITOR_MARKUP {
            content.clear();
        }

        let total = attachments.len() + 1;
        for (written, attachment) in attachments.iter().enumerate() {
            write_atomic(&dir.join(attachment.name()), attachment.bytes()).map_err(|source| {
                StoreError::PartialWrite {
                    written,
                    total,
                    source,
                }
            })?;
        }

        let path = dir.join(NOTE_FILE_NAME);
        write_atomic(&path, content.as_bytes()).map_err(|source| StoreError::PartialWrite {
            written: attachments.len(),
            total,
            source,
        })?;

        log::info!(
            "saved note for {} ({} attachment(s)) to {}",
            key,
            attachments.len(),
            path.display()
        );

        Ok(SavedNote {
            dir,
            path,
            content,
            attachments: attachments.len(),
        })
    }

    /// Loads a day's note with its images resolved for display.
    ///
    /// Returns `None` if no folder is connected, access is denied, or the
    /// day has no note document.
    pub fn get(&self, key: &DateKey) -> Option<DayNote> {
        let dir = self.day_dir(key)?;
        match read_day(&dir) {
            Ok(note) => Some(note),
            Err(e) => {
                log::debug!("no note for {}: {}", key, e);
                None
            }
        }
    }

    /// Loads a day's note exactly as stored on disk.
    pub fn get_portable(&self, key: &DateKey) -> Option<DayNote> {
        let dir = self.day_dir(key)?;
        let (content, updated_at) = read_text(&dir.join(NOTE_FILE_NAME)).ok()?;
        Some(DayNote::new(content, updated_at))
    }

    /// Returns the day's directory path without touching disk.
    pub fn path_of(&self, key: &DateKey) -> Option<PathBuf> {
        let capability = self.ctx.capability()?;
        let mut path = capability.root().to_path_buf();
        path.extend(path_for(key));
        Some(path)
    }

    fn day_dir(&self, key: &DateKey) -> Option<PathBuf> {
        let capability = self.ctx.capability()?;
        if !capability.is_granted() {
            log::debug!("read of {} skipped: permission denied", key);
            return None;
        }
        match resolve_directory(Some(capability), &path_for(key), false) {
            Ok(dir) => dir,
            Err(e) => {
                log::debug!("no directory for {}: {}", key, e);
                None
            }
        }
    }

    fn writable_capability(&self) -> Result<&'a RootCapability, StoreError> {
        let capability = self.ctx.capability().ok_or(StoreError::CapabilityMissing)?;
        if !capability.is_granted() {
            return Err(StoreError::PermissionDenied {
                root: capability.root().to_path_buf(),
            });
        }
        Ok(capability)
    }
}

/// Reads the note document of an already-resolved day directory and
/// resolves its images against that directory.
pub(crate) fn read_day(dir: &Path) -> Result<DayNote, FsError> {
    let (content, updated_at) = read_text(&dir.join(NOTE_FILE_NAME))?;
    let resolved = AssetCodec::new(dir).to_resolved(&content);
    Ok(DayNote::new(resolved, updated_at))
}
