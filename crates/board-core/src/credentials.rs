//! Bearer token storage.
//!
//! The token lives in `${BOARD_HOME}/credentials.json` as `{"authToken": "..."}`
//! with restricted permissions (0600). Tokens are never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(rename = "authToken", default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
}

/// Shared handle to the single bearer-token slot.
///
/// Clones share the same slot. Reads are snapshots taken at call time;
/// only session transitions write.
#[derive(Clone, Default)]
pub struct TokenSlot {
    token: Arc<RwLock<Option<String>>>,
    path: Option<Arc<PathBuf>>,
}

impl std::fmt::Debug for TokenSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSlot")
            .field("token", &self.get().as_deref().map(mask_token))
            .field("path", &self.path())
            .finish()
    }
}

impl TokenSlot {
    /// Slot backed by the default credential file.
    pub fn open_default() -> Result<Self> {
        Self::open(&paths::credentials_path())
    }

    /// Slot backed by `path`. A missing file means no token.
    pub fn open(path: &Path) -> Result<Self> {
        let token = read_token(path)?;
        Ok(Self {
            token: Arc::new(RwLock::new(token)),
            path: Some(Arc::new(path.to_path_buf())),
        })
    }

    /// Slot that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// Snapshot of the current token.
    pub fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_present(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stores `token` in memory and on disk.
    ///
    /// The in-memory slot is updated even when the write fails.
    pub fn set(&self, token: &str) -> Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        match self.path() {
            Some(path) => write_token(path, Some(token)),
            None => Ok(()),
        }
    }

    /// Removes the token. Returns whether one was present.
    pub fn clear(&self) -> Result<bool> {
        let had_token = self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if let Some(path) = self.path()
            && path.exists()
        {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(had_token)
    }
}

fn read_token(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials from {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(None);
    }

    let file: CredentialFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse credentials from {}", path.display()))?;
    Ok(file.auth_token.filter(|t| !t.trim().is_empty()))
}

fn write_token(path: &Path, token: Option<&str>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let file = CredentialFile {
        auth_token: token.map(str::to_string),
    };
    let contents = serde_json::to_string_pretty(&file).context("Failed to serialize credentials")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    Ok(())
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    match token.get(..12) {
        Some(prefix) => format!("{prefix}..."),
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_means_no_token() {
        let dir = tempdir().unwrap();
        let slot = TokenSlot::open(&dir.path().join("credentials.json")).unwrap();
        assert_eq!(slot.get(), None);
        assert!(!slot.is_present());
    }

    #[test]
    fn test_set_persists_under_auth_token_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");
        let slot = TokenSlot::open(&path).unwrap();

        slot.set("tok-123").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["authToken"], "tok-123");
        let reopened = TokenSlot::open(&path).unwrap();
        assert_eq!(reopened.get().as_deref(), Some("tok-123"));
    }

    #[cfg(unix)]
    #[test]
    fn test_credentials_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        TokenSlot::open(&path).unwrap().set("tok").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_clear_removes_file_and_shared_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let slot = TokenSlot::open(&path).unwrap();
        let shared = slot.clone();
        slot.set("tok").unwrap();
        assert_eq!(shared.get().as_deref(), Some("tok"));

        assert!(slot.clear().unwrap());
        assert_eq!(shared.get(), None);
        assert!(!path.exists());
        assert!(!slot.clear().unwrap());
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"authToken":"  "}"#).unwrap();
        assert_eq!(TokenSlot::open(&path).unwrap().get(), None);
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("abcdefghijklmnopqrstuvwxyz"), "abcdefghijkl...");
    }
}
