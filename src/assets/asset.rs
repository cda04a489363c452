//! Asset payloads
//!
//! An asset is a resolved byte payload plus the validators served with it:
//! a quoted 128-bit content-hash ETag and a last-modified time truncated to
//! whole seconds (HTTP dates carry no finer resolution). Two variants
//! exist: resource-tree assets are read once and never change; override
//! assets are backed by a live file and refresh themselves when it does.

use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use bytes::Bytes;
use chrono::Utc;
use tokio::fs;
use tokio::sync::RwLock;
use xxhash_rust::xxh3::xxh3_128;

/// Quoted ETag from a 128-bit content hash.
pub fn content_etag(bytes: &[u8]) -> String {
    format!("\"{:032x}\"", xxh3_128(bytes))
}

/// Drop sub-second precision from an epoch-milliseconds timestamp.
pub(crate) const fn truncate_to_second(ms: i64) -> i64 {
    (ms / 1000) * 1000
}

/// A consistent view of an asset: the bytes and the validators that were
/// computed from exactly those bytes.
#[derive(Debug, Clone)]
pub struct AssetSnapshot {
    pub bytes: Bytes,
    pub etag: String,
    /// Epoch milliseconds, truncated to a whole second.
    pub last_modified_ms: i64,
}

/// A servable asset. Closed set: refresh behavior stays inside the
/// filesystem variant and is never branched on elsewhere.
#[derive(Debug)]
pub enum Asset {
    Static(StaticAsset),
    FileSystem(FileSystemAsset),
}

impl Asset {
    /// Current payload and validators, always mutually consistent.
    pub async fn snapshot(&self) -> AssetSnapshot {
        match self {
            Self::Static(asset) => asset.snapshot(),
            Self::FileSystem(asset) => asset.snapshot().await,
        }
    }

    /// Byte length used by weight-based cache eviction, taken at load time.
    pub fn weight(&self) -> usize {
        match self {
            Self::Static(asset) => asset.bytes.len(),
            Self::FileSystem(asset) => asset.weight,
        }
    }
}

/// An immutable asset loaded from the resource tree.
#[derive(Debug)]
pub struct StaticAsset {
    bytes: Bytes,
    etag: String,
    last_modified_ms: i64,
}

impl StaticAsset {
    /// Wrap raw bytes; the ETag is computed here and the timestamp is
    /// truncated to a whole second.
    pub fn new(bytes: Vec<u8>, last_modified_ms: i64) -> Self {
        let bytes = Bytes::from(bytes);
        let etag = content_etag(&bytes);
        Self {
            bytes,
            etag,
            last_modified_ms: truncate_to_second(last_modified_ms),
        }
    }

    fn snapshot(&self) -> AssetSnapshot {
        AssetSnapshot {
            bytes: self.bytes.clone(),
            etag: self.etag.clone(),
            last_modified_ms: self.last_modified_ms,
        }
    }
}

/// An asset backed by a file on disk.
///
/// Every access compares the file's current modification time against the
/// held snapshot and reloads bytes, ETag and timestamp together when they
/// diverge. Readers never see bytes from one snapshot paired with the
/// validators of another.
#[derive(Debug)]
pub struct FileSystemAsset {
    path: PathBuf,
    weight: usize,
    state: RwLock<FsSnapshot>,
}

/// Internal snapshot; `modified_ms` keeps full precision for comparison
/// against the file's metadata.
#[derive(Debug, Clone)]
struct FsSnapshot {
    bytes: Bytes,
    etag: String,
    modified_ms: i64,
}

impl FsSnapshot {
    fn view(&self) -> AssetSnapshot {
        AssetSnapshot {
            bytes: self.bytes.clone(),
            etag: self.etag.clone(),
            last_modified_ms: truncate_to_second(self.modified_ms),
        }
    }
}

impl FileSystemAsset {
    /// Load the backing file. The initial read must succeed; later refresh
    /// failures fall back to the snapshot already held.
    pub async fn load(path: PathBuf) -> io::Result<Self> {
        let snapshot = read_snapshot(&path).await?;
        let weight = snapshot.bytes.len();
        Ok(Self {
            path,
            weight,
            state: RwLock::new(snapshot),
        })
    }

    async fn snapshot(&self) -> AssetSnapshot {
        let current = file_modified_ms(&self.path).await;
        {
            let state = self.state.read().await;
            // Unreadable metadata counts as unchanged: serve what we have.
            if current.is_none() || current == Some(state.modified_ms) {
                return state.view();
            }
        }

        let mut state = self.state.write().await;
        if current != Some(state.modified_ms) {
            // Double-checked: another task may have refreshed while we
            // waited on the write lock.
            if let Ok(fresh) = read_snapshot(&self.path).await {
                *state = fresh;
            }
        }
        state.view()
    }
}

async fn read_snapshot(path: &Path) -> io::Result<FsSnapshot> {
    let bytes = Bytes::from(fs::read(path).await?);
    let etag = content_etag(&bytes);
    let modified_ms =
        file_modified_ms(path).await.unwrap_or_else(|| Utc::now().timestamp_millis());
    Ok(FsSnapshot {
        bytes,
        etag,
        modified_ms,
    })
}

/// Modification time of a file in epoch milliseconds, when the store can
/// report one.
pub(crate) async fn file_modified_ms(path: &Path) -> Option<i64> {
    let metadata = fs::metadata(path).await.ok()?;
    let modified = metadata.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    i64::try_from(since_epoch.as_millis()).ok()
}
