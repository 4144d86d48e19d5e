//! Persistent storage for the session token pair.
//!
//! Stores the access/refresh pair in `<QUILL_HOME>/credentials.json` with
//! restricted permissions (0600). Tokens are never logged in full. The store
//! holds both tokens or neither, so a loaded credential is always a usable
//! pair.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// An access/refresh token pair identifying an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The access token (short-lived, sent as bearer).
    pub access: String,
    /// The refresh token (long-lived, revoked on logout).
    pub refresh: String,
}

/// File-backed slot for the persisted [`Credential`].
///
/// `SessionManager` is the only writer; everything else reads through it.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store over the default credentials path.
    pub fn new() -> Self {
        Self::at(paths::credentials_path())
    }

    /// Creates a store over a specific path (tests, alternate homes).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the credential pair from disk.
    /// Returns `None` if the slot is empty or unreadable as a pair.
    pub fn load(&self) -> Option<Credential> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Credential>(&contents) {
            Ok(credential) => Some(credential),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding malformed credential file");
                None
            }
        }
    }

    /// Saves the credential pair to disk with restricted permissions (0600).
    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(credential).context("Failed to serialize credential")?;

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Clears the persisted slot. Missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::at(dir.path().join("credentials.json"))
    }

    #[test]
    fn round_trips_a_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.load().is_none());

        let credential = Credential {
            access: "acc".into(),
            refresh: "ref".into(),
        };
        store.save(&credential).unwrap();
        assert_eq!(store.load(), Some(credential));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.clear().unwrap();
        store
            .save(&Credential {
                access: "a".into(),
                refresh: "r".into(),
            })
            .unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn malformed_slot_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(dir.path().join("credentials.json"), "{\"access\": \"only\"}").unwrap();
        assert!(store.load().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&Credential {
                access: "a".into(),
                refresh: "r".into(),
            })
            .unwrap();

        let mode = std::fs::metadata(dir.path().join("credentials.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
