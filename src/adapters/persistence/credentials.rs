//! Credential File - Durable Access Token Storage
//!
//! Keeps the access token in a single file, written atomically (write
//! to tmp file, then rename) so a crash never leaves a half-written
//! token behind. On Unix the file is created with mode 0600.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::ports::{Credential, CredentialStore};

/// File-backed credential store.
pub struct FileCredentialStore {
    /// Path to the token file.
    path: PathBuf,
    /// Temporary path for atomic writes.
    tmp_path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store at `path`. Nothing touches the disk until first use.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        Self {
            path,
            tmp_path: PathBuf::from(tmp),
        }
    }

    /// Location of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the token to a fresh owner-only tmp file, then rename it
    /// over the real one.
    async fn write_and_swap(&self, credential: &Credential) -> Result<()> {
        // A stale tmp file may carry wider permissions; start from scratch
        match fs::remove_file(&self.tmp_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).context("Failed to remove stale tmp credential file"),
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&self.tmp_path)
            .await
            .context("Failed to create tmp credential file")?;
        file.write_all(credential.expose().as_bytes())
            .await
            .context("Failed to write tmp credential file")?;
        file.sync_all()
            .await
            .context("Failed to flush tmp credential file")?;
        drop(file);

        // Atomic rename
        fs::rename(&self.tmp_path, &self.path)
            .await
            .context("Failed to rename credential file")
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<Credential>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No credential file found");
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to read credential file"),
        };

        let token = raw.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(Credential::new(token)))
    }

    #[instrument(skip(self, credential), fields(path = %self.path.display()))]
    async fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .context("Failed to create credential directory")?;
        }

        if let Err(e) = self.write_and_swap(credential).await {
            // Never leave a copy of the token behind
            if let Err(cleanup) = fs::remove_file(&self.tmp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(error = %cleanup, "Failed to remove tmp credential file");
                }
            }
            return Err(e);
        }

        info!("Credential stored");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Credential erased");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove credential file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_without_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("token"));

        store.save(&Credential::new("ghp_abc")).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(Credential::new("ghp_abc")));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_tmp_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        // A non-empty directory at the target makes the rename fail
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(store.save(&Credential::new("ghp_secret")).await.is_err());
        assert!(!dir.path().join("token.tmp").exists());
    }

    #[tokio::test]
    async fn test_surrounding_whitespace_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  ghp_abc\n").unwrap();

        let store = FileCredentialStore::new(&path);
        assert_eq!(store.load().await.unwrap(), Some(Credential::new("ghp_abc")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token"));
        store.save(&Credential::new("ghp_abc")).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stale_world_readable_tmp_is_replaced() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join("token.tmp");
        std::fs::write(&tmp, "old").unwrap();
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileCredentialStore::new(dir.path().join("token"));
        store.save(&Credential::new("ghp_abc")).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!tmp.exists());
    }
}
