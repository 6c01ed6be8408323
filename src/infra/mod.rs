//! File I/O, markup rewriting, root capability

mod assets;
mod capability;
mod fs;
mod markup;

pub use assets::{AssetCodec, PORTABLE_PREFIX, Rewrite, file_url, path_from_file_url, portable_name};
pub use capability::{
    CapabilityError, CapabilityStore, FsPermissionGate, Permission, PermissionGate,
    PermissionPrompt, RootCapability, StorageContext,
};
pub use fs::{FsError, NOTE_FILE_NAME, modified_time, path_for, read_text, resolve_directory, write_atomic};
pub use markup::{Document, ImageElement};
