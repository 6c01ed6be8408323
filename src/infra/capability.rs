//! Root capability: the granted handle to the journal directory, its
//! permission checks, and persistence across process restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use super::fs::{FsError, write_atomic};

/// Outcome of a permission check on a root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Decides whether read/write access to a root is currently granted.
///
/// Access can be revoked from outside the process at any time, so callers
/// query the gate before every mutating operation instead of caching the
/// answer.
pub trait PermissionGate: Send + Sync {
    fn query(&self, root: &Path) -> Permission;
}

/// Checks the real file system: the root must exist, be a listable
/// directory, and not be read-only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsPermissionGate;

impl PermissionGate for FsPermissionGate {
    fn query(&self, root: &Path) -> Permission {
        let Ok(meta) = std::fs::metadata(root) else {
            return Permission::Denied;
        };
        if !meta.is_dir() || meta.permissions().readonly() {
            return Permission::Denied;
        }
        match std::fs::read_dir(root) {
            Ok(_) => Permission::Granted,
            Err(_) => Permission::Denied,
        }
    }
}

/// The UI's answer to "grant access to this folder?".
///
/// The storage layer never prompts by itself; it asks this collaborator.
pub trait PermissionPrompt {
    fn confirm(&mut self, root: &Path) -> bool;
}

impl<F: FnMut(&Path) -> bool> PermissionPrompt for F {
    fn confirm(&mut self, root: &Path) -> bool {
        self(root)
    }
}

/// Errors from the capability layer.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("cannot use {path} as journal folder: {source}")]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("journal folder is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("failed to persist journal folder: {0}")]
    Persist(#[from] FsError),

    #[error("corrupt capability state in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A handle granting access to the journal's root directory.
///
/// Cheap to clone; clones share the permission gate.
#[derive(Clone)]
pub struct RootCapability {
    root: PathBuf,
    gate: Arc<dyn PermissionGate>,
}

impl RootCapability {
    /// Creates a capability for an existing directory, checked against the
    /// real file system.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized or is not a
    /// directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, CapabilityError> {
        Self::with_gate(root, Arc::new(FsPermissionGate))
    }

    /// Creates a capability that consults `gate` for permission checks.
    pub fn with_gate(
        root: impl AsRef<Path>,
        gate: Arc<dyn PermissionGate>,
    ) -> Result<Self, CapabilityError> {
        let root = root.as_ref();
        let canonical = root
            .canonicalize()
            .map_err(|source| CapabilityError::InvalidRoot {
                path: root.to_path_buf(),
                source,
            })?;
        if !canonical.is_dir() {
            return Err(CapabilityError::NotADirectory { path: canonical });
        }
        Ok(Self {
            root: canonical,
            gate,
        })
    }

    /// Rebuilds a capability from a persisted path without touching disk;
    /// the directory may have disappeared since it was saved.
    fn from_persisted(root: PathBuf, gate: Arc<dyn PermissionGate>) -> Self {
        Self { root, gate }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn query_permission(&self) -> Permission {
        self.gate.query(&self.root)
    }

    pub fn is_granted(&self) -> bool {
        self.query_permission() == Permission::Granted
    }
}

impl fmt::Debug for RootCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootCapability")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl PartialEq for RootCapability {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

/// The storage dependency threaded into every repository and indexer call.
///
/// An empty context means no journal folder has been selected; reads then
/// yield nothing and writes fail with a "reconnect folder" error.
#[derive(Debug, Clone, Default)]
pub struct StorageContext {
    capability: Option<RootCapability>,
}

impl StorageContext {
    pub fn new(capability: Option<RootCapability>) -> Self {
        Self { capability }
    }

    pub fn with_root(capability: RootCapability) -> Self {
        Self::new(Some(capability))
    }

    pub fn detached() -> Self {
        Self::default()
    }

    pub fn capability(&self) -> Option<&RootCapability> {
        self.capability.as_ref()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedRoot {
    root: PathBuf,
    saved_at: DateTime<Utc>,
}

/// Persists the current journal root across process lifetimes.
pub struct CapabilityStore {
    state_path: PathBuf,
    gate: Arc<dyn PermissionGate>,
    active: Option<RootCapability>,
    /// Persisted root whose permission check failed on load.
    candidate: Option<RootCapability>,
}

impl CapabilityStore {
    /// Creates a store persisting to `state_path`, checking permissions
    /// against the real file system.
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self::with_gate(state_path, Arc::new(FsPermissionGate))
    }

    pub fn with_gate(state_path: impl Into<PathBuf>, gate: Arc<dyn PermissionGate>) -> Self {
        Self {
            state_path: state_path.into(),
            gate,
            active: None,
            candidate: None,
        }
    }

    /// Returns the default state file location.
    ///
    /// Default: `<data dir>/chronicle/root.json`
    pub fn default_state_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chronicle")
            .join("root.json")
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Makes `capability` the current root and persists it, replacing any
    /// earlier root.
    ///
    /// Persistence is best effort: a failure is logged and the capability
    /// still becomes active for this process.
    pub fn save(&mut self, capability: RootCapability) {
        if let Err(e) = self.persist(&capability) {
            log::warn!("{}", e);
        }
        log::info!("journal folder set to {}", capability.root().display());
        self.candidate = None;
        self.active = Some(capability);
    }

    fn persist(&self, capability: &RootCapability) -> Result<(), CapabilityError> {
        if let Some(parent) = self.state_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FsError::from_io(parent, e))?;
        }
        let state = PersistedRoot {
            root: capability.root().to_path_buf(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&state).map_err(|source| CapabilityError::Corrupt {
            path: self.state_path.clone(),
            source,
        })?;
        write_atomic(&self.state_path, &json)?;
        Ok(())
    }

    fn read_persisted(&self) -> Result<Option<PathBuf>, CapabilityError> {
        let bytes = match std::fs::read(&self.state_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FsError::from_io(&self.state_path, e).into()),
        };
        let state: PersistedRoot =
            serde_json::from_slice(&bytes).map_err(|source| CapabilityError::Corrupt {
                path: self.state_path.clone(),
                source,
            })?;
        Ok(Some(state.root))
    }

    /// Loads the persisted root and activates it if access is still granted.
    ///
    /// Returns `None` if no root was ever saved or if its permission is no
    /// longer granted. A denied root is remembered so that
    /// [`request_permission`](Self::request_permission) can re-activate it.
    pub fn load(&mut self) -> Option<RootCapability> {
        let root = match self.read_persisted() {
            Ok(Some(root)) => root,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("{}", e);
                return None;
            }
        };

        let capability = RootCapability::from_persisted(root, Arc::clone(&self.gate));
        if capability.is_granted() {
            self.candidate = None;
            self.active = Some(capability.clone());
            Some(capability)
        } else {
            log::info!(
                "journal folder {} is no longer accessible",
                capability.root().display()
            );
            self.candidate = Some(capability);
            None
        }
    }

    /// Re-asserts read/write access on the current root, asking `prompt`
    /// only when the check fails.
    ///
    /// Returns false if there is no root or the user declines, or if access
    /// is still denied after the user agreed.
    pub fn request_permission(&mut self, prompt: &mut impl PermissionPrompt) -> bool {
        let Some(capability) = self.active.clone().or_else(|| self.candidate.clone()) else {
            return false;
        };

        if capability.is_granted() {
            self.activate(capability);
            return true;
        }

        if !prompt.confirm(capability.root()) {
            return false;
        }

        if capability.is_granted() {
            self.activate(capability);
            true
        } else {
            false
        }
    }

    fn activate(&mut self, capability: RootCapability) {
        self.candidate = None;
        self.active = Some(capability);
    }

    /// Returns the active root, if any.
    pub fn active(&self) -> Option<&RootCapability> {
        self.active.as_ref()
    }

    /// Returns the persisted root that failed its permission check, if any.
    pub fn candidate(&self) -> Option<&RootCapability> {
        self.candidate.as_ref()
    }

    /// Returns a storage context for the active root.
    pub fn context(&self) -> StorageContext {
        StorageContext::new(self.active.clone())
    }
}
