//! Client-side credential storage.
//!
//! Short-lived credentials (admin, admin two-factor pending, primary user)
//! live in a [`CredentialStore`] under fixed keys. The federated session is
//! owned by the identity provider and never written here.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::CredentialStoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    Admin,
    AdminTemp,
    Access,
    Federated,
}

impl CredentialKind {
    /// Kinds kept in the credential store, highest priority first.
    pub const STORED: [CredentialKind; 3] = [
        CredentialKind::Admin,
        CredentialKind::AdminTemp,
        CredentialKind::Access,
    ];

    /// Kinds granted by admin elevation.
    pub const ELEVATED: [CredentialKind; 2] = [CredentialKind::Admin, CredentialKind::AdminTemp];

    /// Key under which the credential is stored; `None` for federated sessions.
    #[must_use]
    pub fn storage_key(self) -> Option<&'static str> {
        match self {
            CredentialKind::Admin => Some("admin_token"),
            CredentialKind::AdminTemp => Some("admin_temp_token"),
            CredentialKind::Access => Some("access_token"),
            CredentialKind::Federated => None,
        }
    }
}

/// The credential attached to one outgoing request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub kind: CredentialKind,
    pub value: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("value", &"[redacted]")
            .finish()
    }
}

pub trait CredentialStore: Send + Sync {
    fn get(&self, kind: CredentialKind) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`CredentialStoreError::NotStorable`] for federated credentials,
    /// or a backend error if the value cannot be persisted.
    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), CredentialStoreError>;

    /// Removes every kind in `kinds` in one step.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the removal cannot be persisted.
    fn clear(&self, kinds: &[CredentialKind]) -> Result<(), CredentialStoreError>;
}

/// In-process store; the default for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<CredentialKind, String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, kind: CredentialKind) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
    }

    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), CredentialStoreError> {
        if kind.storage_key().is_none() {
            return Err(CredentialStoreError::NotStorable(kind));
        }
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, value.to_owned());
        Ok(())
    }

    fn clear(&self, kinds: &[CredentialKind]) -> Result<(), CredentialStoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        for kind in kinds {
            values.remove(kind);
        }
        Ok(())
    }
}

/// JSON file keyed by storage key, used by the command line front end.
///
/// Writes go to a sibling temp file that is then renamed over the original,
/// so a crash never leaves a half-written store behind. A missing file is an
/// empty store.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, CredentialStoreError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(source) => {
                return Err(CredentialStoreError::Io {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };
        serde_json::from_slice(&raw).map_err(|source| CredentialStoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), CredentialStoreError> {
        let io_err = |source| CredentialStoreError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_vec_pretty(values).map_err(|source| {
            CredentialStoreError::Corrupt {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }

    fn modify<F>(&self, change: F) -> Result<(), CredentialStoreError>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.load()?;
        change(&mut values);
        self.persist(&values)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, kind: CredentialKind) -> Option<String> {
        let key = kind.storage_key()?;
        match self.load() {
            Ok(mut values) => values.remove(key),
            Err(e) => {
                tracing::warn!(error = %e, "could not read credential store; treating as empty");
                None
            }
        }
    }

    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), CredentialStoreError> {
        let key = kind
            .storage_key()
            .ok_or(CredentialStoreError::NotStorable(kind))?;
        self.modify(|values| {
            values.insert(key.to_owned(), value.to_owned());
        })
    }

    fn clear(&self, kinds: &[CredentialKind]) -> Result<(), CredentialStoreError> {
        let keys: Vec<&str> = kinds.iter().filter_map(|k| k.storage_key()).collect();
        self.modify(|values| {
            for key in keys {
                values.remove(key);
            }
        })
    }
}
