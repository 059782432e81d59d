//! Write-through JSON file store.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{
    DurableStore, StoreError,
    persistence::{read_snapshot, write_snapshot},
};
use crate::{Error, Result};

/// A [`DurableStore`] that persists every mutation to a single JSON file.
///
/// The file is read once on [`open`](JsonFileStore::open) and then kept in
/// memory; each `set`/`remove` rewrites the whole snapshot before returning.
/// The lock is held across the write so two mutations can never interleave
/// their snapshots.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A file that cannot be decoded is moved aside to `<path>.corrupt` and
    /// the store starts empty. I/O failures are still returned.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match read_snapshot(&path).await {
            Ok(entries) => entries,
            Err(Error::Store(e)) if e.is_corruption() => {
                let aside = corrupt_path(&path);
                warn!(
                    path = %path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "State file unreadable; starting empty"
                );
                tokio::fs::rename(&path, &aside)
                    .await
                    .map_err(|source| StoreError::FileIo {
                        path: aside.clone(),
                        source,
                    })?;
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened JSON file store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// The file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Where an undecodable state file is preserved.
fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

#[async_trait]
impl DurableStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let previous = entries.insert(key.to_string(), value);
        if let Err(e) = write_snapshot(&self.path, &entries).await {
            // Keep memory consistent with what is on disk
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = write_snapshot(&self.path, &entries).await {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
