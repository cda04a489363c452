//! Asset resolution module
//!
//! Maps a request path to an asset: the first matching resource mapping is
//! committed, overrides are consulted before the resource tree, and
//! directories fall back to the configured index file. Every I/O failure
//! inside an attempt resolves to "not found" - the protocol layer only
//! ever sees an asset or its absence.

use std::path::PathBuf;

use chrono::Utc;
use tokio::fs;

use crate::assets::asset::{file_modified_ms, Asset, FileSystemAsset, StaticAsset};
use crate::assets::mapping::{OverrideMappings, ResourceMapping, ResourceMappings};
use crate::logger;

/// Resolves request paths against the mapping tables and the resource
/// tree. Shared read-only between all requests; the cache owns one.
#[derive(Debug)]
pub struct AssetLoader {
    /// Base directory holding the bundled resource roots.
    resource_dir: PathBuf,
    mappings: ResourceMappings,
    overrides: OverrideMappings,
    index_file: Option<String>,
}

impl AssetLoader {
    pub fn new(
        resource_dir: PathBuf,
        mappings: ResourceMappings,
        overrides: OverrideMappings,
        index_file: Option<String>,
    ) -> Self {
        Self {
            resource_dir,
            mappings,
            overrides,
            index_file,
        }
    }

    /// Resolve a request path to an asset.
    ///
    /// `None` is the not-found signal; the cache stores it so repeated
    /// probes for the same missing path skip the filesystem entirely.
    pub async fn load(&self, path: &str) -> Option<Asset> {
        let mapping = self.mappings.matching(path)?;

        if let Some(file) = self.resolve_override(path).await {
            return match FileSystemAsset::load(file).await {
                Ok(asset) => Some(Asset::FileSystem(asset)),
                Err(err) => {
                    logger::log_warning(&format!("failed to read override for '{path}': {err}"));
                    None
                }
            };
        }

        self.load_resource(mapping, path).await.map(Asset::Static)
    }

    /// First override candidate that exists on disk, with directory
    /// targets re-resolved to their index file.
    async fn resolve_override(&self, path: &str) -> Option<PathBuf> {
        for mut candidate in self.overrides.candidates(path) {
            let Ok(metadata) = fs::metadata(&candidate).await else {
                continue;
            };
            if metadata.is_dir() {
                // Index fallback only - directory listings are not served.
                let Some(index_file) = self.index_file.as_deref() else {
                    continue;
                };
                candidate.push(index_file);
                if fs::metadata(&candidate).await.is_err() {
                    continue;
                }
            }
            return Some(candidate);
        }
        None
    }

    async fn load_resource(&self, mapping: &ResourceMapping, path: &str) -> Option<StaticAsset> {
        let requested = path[mapping.uri_root.len()..].trim_matches('/');
        let relative = format!("{}{}", mapping.resource_root, requested);
        let relative = relative.trim_matches('/');
        let mut file = self.resource_dir.join(relative);

        let root = self
            .resource_dir
            .join(mapping.resource_root.trim_end_matches('/'));
        let root = fs::canonicalize(&root).await.ok()?;

        if let Ok(metadata) = fs::metadata(&file).await {
            if metadata.is_dir() {
                let index_file = self.index_file.as_deref()?;
                file.push(index_file);
            }
        }

        // Resolve symlinks and dot segments before the containment check.
        let resolved = fs::canonicalize(&file).await.ok()?;
        if !resolved.starts_with(&root) {
            logger::log_warning(&format!("blocked path escaping its resource root: {path}"));
            return None;
        }

        let bytes = match fs::read(&resolved).await {
            Ok(bytes) => bytes,
            Err(err) => {
                logger::log_error(&format!(
                    "failed to read resource '{}': {err}",
                    resolved.display()
                ));
                return None;
            }
        };

        let modified_ms = file_modified_ms(&resolved)
            .await
            .filter(|ms| *ms >= 1)
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        Some(StaticAsset::new(bytes, modified_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::asset::content_etag;
    use std::path::Path;
    use tempfile::TempDir;

    async fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.unwrap();
        }
        fs::write(path, content).await.unwrap();
    }

    /// Resource tree used by most tests:
    /// `assets/example.txt`, `assets/index.htm`,
    /// `assets/some_directory/index.htm`, `json/example.txt`.
    async fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("assets/example.txt"), "HELLO THERE").await;
        write(&dir.path().join("assets/index.htm"), "assets index").await;
        write(
            &dir.path().join("assets/some_directory/index.htm"),
            "subdirectory index",
        )
        .await;
        write(&dir.path().join("json/example.txt"), "HELLO JSON").await;
        dir
    }

    fn loader(
        dir: &TempDir,
        mappings: &[(&str, &str)],
        overrides: &[(&str, &str)],
        index_file: Option<&str>,
    ) -> AssetLoader {
        AssetLoader::new(
            dir.path().to_path_buf(),
            ResourceMappings::new(mappings.iter().copied()).unwrap(),
            OverrideMappings::new(overrides.iter().copied()),
            index_file.map(ToString::to_string),
        )
    }

    #[tokio::test]
    async fn test_loads_mapped_resource() {
        let dir = fixture().await;
        let loader = loader(&dir, &[("/assets", "/static")], &[], None);

        let asset = loader.load("/static/example.txt").await.unwrap();
        let snapshot = asset.snapshot().await;
        assert_eq!(snapshot.bytes.as_ref(), b"HELLO THERE");
        assert_eq!(snapshot.etag, content_etag(b"HELLO THERE"));
    }

    #[tokio::test]
    async fn test_unmapped_path_is_none() {
        let dir = fixture().await;
        let loader = loader(&dir, &[("/assets", "/static")], &[], None);
        assert!(loader.load("/elsewhere/example.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_resource_is_none() {
        let dir = fixture().await;
        let loader = loader(&dir, &[("/assets", "/static")], &[], None);
        assert!(loader.load("/static/missing.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_directory_serves_index_when_configured() {
        let dir = fixture().await;
        let loader = loader(&dir, &[("/assets", "/static")], &[], Some("index.htm"));

        for path in ["/static", "/static/", "/static/some_directory", "/static/some_directory/"] {
            let asset = loader.load(path).await.unwrap();
            let snapshot = asset.snapshot().await;
            assert!(
                snapshot.bytes.ends_with(b"index"),
                "expected index content for {path}"
            );
        }
    }

    #[tokio::test]
    async fn test_directory_without_index_is_none() {
        let dir = fixture().await;
        let loader = loader(&dir, &[("/assets", "/static")], &[], None);
        assert!(loader.load("/static").await.is_none());
        assert!(loader.load("/static/some_directory").await.is_none());
    }

    #[tokio::test]
    async fn test_first_matching_mapping_commits() {
        let dir = fixture().await;
        // Both uri roots prefix-match; the file only exists under json/.
        let loader = loader(
            &dir,
            &[("/assets", "/files"), ("/json", "/files/json")],
            &[],
            None,
        );
        // The first mapping matches "/files/json/example.txt" and resolution
        // under assets/ fails; there is no fall-through to the second.
        assert!(loader.load("/files/json/example.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_mappings_do_not_pollute_each_other() {
        let dir = fixture().await;
        let loader = loader(
            &dir,
            &[("/assets", "/mm_assets"), ("/json", "/mm_json")],
            &[],
            None,
        );

        let asset = loader.load("/mm_assets/example.txt").await.unwrap();
        assert_eq!(asset.snapshot().await.bytes.as_ref(), b"HELLO THERE");

        let asset = loader.load("/mm_json/example.txt").await.unwrap();
        assert_eq!(asset.snapshot().await.bytes.as_ref(), b"HELLO JSON");
    }

    #[tokio::test]
    async fn test_root_mapping_serves_resource_tree() {
        let dir = fixture().await;
        let loader = loader(&dir, &[("/", "/")], &[], None);
        let asset = loader.load("/assets/example.txt").await.unwrap();
        assert_eq!(asset.snapshot().await.bytes.as_ref(), b"HELLO THERE");
    }

    #[tokio::test]
    async fn test_traversal_outside_resource_root_blocked() {
        let dir = fixture().await;
        write(&dir.path().join("secret.txt"), "secret").await;
        let loader = loader(&dir, &[("/assets", "/static")], &[], None);

        assert!(loader.load("/static/../secret.txt").await.is_none());
        assert!(loader.load("/static/../json/example.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_override_beats_resource_tree() {
        let dir = fixture().await;
        let dev = TempDir::new().unwrap();
        write(&dev.path().join("example.txt"), "OVERRIDDEN").await;

        let loader = loader(
            &dir,
            &[("/assets", "/static")],
            &[("/static", dev.path().to_str().unwrap())],
            None,
        );

        let asset = loader.load("/static/example.txt").await.unwrap();
        assert!(matches!(asset, Asset::FileSystem(_)));
        assert_eq!(asset.snapshot().await.bytes.as_ref(), b"OVERRIDDEN");
    }

    #[tokio::test]
    async fn test_exact_override_maps_to_target_file() {
        let dir = fixture().await;
        let dev = TempDir::new().unwrap();
        let target = dev.path().join("pinned.js");
        write(&target, "pinned contents").await;

        let loader = loader(
            &dir,
            &[("/assets", "/static")],
            &[("/static/app.js", target.to_str().unwrap())],
            None,
        );

        let asset = loader.load("/static/app.js").await.unwrap();
        assert_eq!(asset.snapshot().await.bytes.as_ref(), b"pinned contents");
    }

    #[tokio::test]
    async fn test_override_directory_uses_index() {
        let dir = fixture().await;
        let dev = TempDir::new().unwrap();
        write(&dev.path().join("docs/index.htm"), "override index").await;

        let loader = loader(
            &dir,
            &[("/assets", "/static")],
            &[("/static", dev.path().to_str().unwrap())],
            Some("index.htm"),
        );

        let asset = loader.load("/static/docs").await.unwrap();
        assert_eq!(asset.snapshot().await.bytes.as_ref(), b"override index");
    }

    #[tokio::test]
    async fn test_override_directory_without_index_falls_through() {
        let dir = fixture().await;
        let dev = TempDir::new().unwrap();
        fs::create_dir_all(dev.path().join("docs")).await.unwrap();

        let loader = loader(
            &dir,
            &[("/assets", "/static")],
            &[("/static", dev.path().to_str().unwrap())],
            None,
        );

        // The override directory matches but has no index; resolution falls
        // back to the resource tree, which has nothing under docs/ either.
        assert!(loader.load("/static/docs").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_override_candidate_uses_resource_tree() {
        let dir = fixture().await;
        let dev = TempDir::new().unwrap();

        let loader = loader(
            &dir,
            &[("/assets", "/static")],
            &[("/static", dev.path().to_str().unwrap())],
            None,
        );

        let asset = loader.load("/static/example.txt").await.unwrap();
        assert!(matches!(asset, Asset::Static(_)));
        assert_eq!(asset.snapshot().await.bytes.as_ref(), b"HELLO THERE");
    }
}
