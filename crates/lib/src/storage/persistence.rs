//! On-disk snapshot format shared by the file-backed stores.
//!
//! A snapshot is the whole key-value map serialized as one JSON document,
//! tagged with a format version. Writes go to a sibling temporary file that
//! is renamed over the target, so a crash mid-write leaves the previous
//! snapshot intact.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::Result;

/// The current snapshot format version.
/// v0 indicates this is an unstable format subject to breaking changes.
pub(crate) const SNAPSHOT_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(rename = "_v", default, skip_serializing_if = "is_v0")]
    version: u8,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Load a snapshot from `path`. A missing file yields an empty map.
pub(crate) async fn read_snapshot(path: &Path) -> Result<BTreeMap<String, String>> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(StoreError::FileIo {
                path: path.to_path_buf(),
                source: e,
            }
            .into());
        }
    };

    let snapshot: Snapshot =
        serde_json::from_str(&json).map_err(|e| StoreError::DeserializationFailed {
            key: path.display().to_string(),
            source: e,
        })?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            key: path.display().to_string(),
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        }
        .into());
    }
    Ok(snapshot.entries)
}

/// Atomically replace the snapshot at `path` with `entries`.
pub(crate) async fn write_snapshot(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        entries: entries.clone(),
    };
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| StoreError::SerializationFailed { source: e })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::FileIo {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| StoreError::FileIo {
            path: tmp.clone(),
            source: e,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::FileIo {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
