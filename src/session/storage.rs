//! Durable credential storage.
//!
//! DESIGN
//! ======
//! Two keyed entries are kept side by side: the bearer token and the
//! serialized principal snapshot. They are written together and erased
//! together. Readers that only need the token (the API client) get a
//! [`TokenSource`] handle, which has no write methods, so the session store
//! stays the only writer.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::StorageError;

pub const TOKEN_KEY: &str = "token";
pub const PRINCIPAL_KEY: &str = "user";

/// Read-only access to the stored bearer token.
pub trait TokenSource: Send + Sync {
    /// Current token, or `None` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn token(&self) -> Result<Option<String>, StorageError>;
}

/// Full read/write access to the credential pair.
pub trait CredentialStore: TokenSource {
    /// Raw serialized principal, if one is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn principal_raw(&self) -> Result<Option<String>, StorageError>;

    /// Write token and principal as one unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair cannot be persisted.
    fn store_pair(&self, token: &str, principal: &str) -> Result<(), StorageError>;

    /// Remove both entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries cannot be removed.
    fn erase_pair(&self) -> Result<(), StorageError>;
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON file holding both entries. Writes go through a sibling temp file and
/// a rename so a crash never leaves half a pair on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(ToOwned::to_owned).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenSource for FileStore {
    fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(TOKEN_KEY))
    }
}

impl CredentialStore for FileStore {
    fn principal_raw(&self) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(PRINCIPAL_KEY))
    }

    fn store_pair(&self, token: &str, principal: &str) -> Result<(), StorageError> {
        let mut entries = BTreeMap::new();
        entries.insert(TOKEN_KEY.to_owned(), token.to_owned());
        entries.insert(PRINCIPAL_KEY.to_owned(), principal.to_owned());
        let body = serde_json::to_vec_pretty(&entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        write_private(&tmp, &body)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "credential pair stored");
        Ok(())
    }

    fn erase_pair(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "credential pair erased");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `body` to `path`, readable and writable by the owner only.
fn write_private(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies when the file is created; a leftover temp file keeps its bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(body)?;
    file.sync_all()
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw entries, bypassing pair semantics. Used to model whatever a
    /// previous run (or a tampering user) left behind.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { entries: Mutex::new(map) }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

impl TokenSource for MemoryStore {
    fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get(TOKEN_KEY))
    }
}

impl CredentialStore for MemoryStore {
    fn principal_raw(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get(PRINCIPAL_KEY))
    }

    fn store_pair(&self, token: &str, principal: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(TOKEN_KEY.to_owned(), token.to_owned());
        entries.insert(PRINCIPAL_KEY.to_owned(), principal.to_owned());
        Ok(())
    }

    fn erase_pair(&self) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(TOKEN_KEY);
        entries.remove(PRINCIPAL_KEY);
        Ok(())
    }
}
