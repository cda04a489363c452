//! Asset memoization module
//!
//! A moka-backed cache keyed on the request path. Each key is computed at
//! most once no matter how many requests race on it, and a "not found"
//! outcome is cached like any other result so repeated probes for the same
//! missing path stay off the filesystem.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::assets::asset::Asset;
use crate::assets::loader::AssetLoader;
use crate::error::ConfigError;

/// Cache spec applied when the configuration does not supply one.
pub const DEFAULT_CACHE_SPEC: &str = "maximumSize=100";

/// Cached outcome of one resolution; `None` is the not-found sentinel.
type Resolved = Option<Arc<Asset>>;

/// Parsed cache specification.
///
/// The grammar is a comma-separated `key=value` list:
/// `maximumSize` (entry count) or `maximumWeight` (total bytes) - exactly
/// one of the two - plus optional `expireAfterWrite`, `expireAfterAccess`
/// (durations like `30s`, `10m`, `1h`, `2d`) and `initialCapacity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSpec {
    sizing: Sizing,
    expire_after_write: Option<Duration>,
    expire_after_access: Option<Duration>,
    initial_capacity: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sizing {
    MaxEntries(u64),
    MaxWeight(u64),
}

impl CacheSpec {
    /// Parse a cache specification string, e.g.
    /// `maximumWeight=10485760,expireAfterAccess=10m`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidCacheSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let mut max_entries = None;
        let mut max_weight = None;
        let mut expire_after_write = None;
        let mut expire_after_access = None;
        let mut initial_capacity = None;

        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| invalid("expected key=value"))?;
            let value = value.trim();
            match key.trim() {
                "maximumSize" => {
                    max_entries = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("maximumSize must be an integer"))?,
                    );
                }
                "maximumWeight" => {
                    max_weight = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("maximumWeight must be an integer"))?,
                    );
                }
                "expireAfterWrite" => {
                    expire_after_write =
                        Some(parse_duration(value).ok_or_else(|| {
                            invalid("expireAfterWrite must be a duration like 10m")
                        })?);
                }
                "expireAfterAccess" => {
                    expire_after_access =
                        Some(parse_duration(value).ok_or_else(|| {
                            invalid("expireAfterAccess must be a duration like 10m")
                        })?);
                }
                "initialCapacity" => {
                    initial_capacity = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("initialCapacity must be an integer"))?,
                    );
                }
                other => return Err(invalid(&format!("unknown key '{other}'"))),
            }
        }

        let sizing = match (max_entries, max_weight) {
            (Some(_), Some(_)) => {
                return Err(invalid("maximumSize and maximumWeight are mutually exclusive"))
            }
            (Some(entries), None) => Sizing::MaxEntries(entries),
            (None, Some(weight)) => Sizing::MaxWeight(weight),
            (None, None) => return Err(invalid("one of maximumSize or maximumWeight is required")),
        };

        Ok(Self {
            sizing,
            expire_after_write,
            expire_after_access,
            initial_capacity,
        })
    }
}

/// Duration literal: integer plus one of `d`, `h`, `m`, `s`.
fn parse_duration(value: &str) -> Option<Duration> {
    let (count, unit) = value.split_at(value.len().checked_sub(1)?);
    let count: u64 = count.parse().ok()?;
    let seconds = match unit {
        "d" => count.checked_mul(24 * 60 * 60)?,
        "h" => count.checked_mul(60 * 60)?,
        "m" => count.checked_mul(60)?,
        "s" => count,
        _ => return None,
    };
    Some(Duration::from_secs(seconds))
}

/// Memoizing front of the asset loader.
pub struct AssetCache {
    entries: Cache<String, Resolved>,
    loader: Arc<AssetLoader>,
}

impl AssetCache {
    /// Build a cache honoring the given spec.
    ///
    /// With a weight-based spec, entries weigh their asset's byte length
    /// (not-found entries weigh one) and the capacity bounds the total;
    /// with a size-based spec the capacity bounds the entry count.
    pub fn new(spec: &CacheSpec, loader: AssetLoader) -> Self {
        let mut builder = Cache::builder();
        match spec.sizing {
            Sizing::MaxEntries(entries) => {
                builder = builder.max_capacity(entries);
            }
            Sizing::MaxWeight(weight) => {
                builder = builder.max_capacity(weight).weigher(|_key, value: &Resolved| {
                    value
                        .as_ref()
                        .map_or(1, |asset| u32::try_from(asset.weight()).unwrap_or(u32::MAX))
                        .max(1)
                });
            }
        }
        if let Some(ttl) = spec.expire_after_write {
            builder = builder.time_to_live(ttl);
        }
        if let Some(tti) = spec.expire_after_access {
            builder = builder.time_to_idle(tti);
        }
        if let Some(capacity) = spec.initial_capacity {
            builder = builder.initial_capacity(capacity);
        }

        Self {
            entries: builder.build(),
            loader: Arc::new(loader),
        }
    }

    /// Look up an asset, resolving it at most once per key.
    ///
    /// Concurrent callers for the same uncached key all wait on the single
    /// in-flight resolution and receive its result.
    pub async fn get(&self, path: &str) -> Option<Arc<Asset>> {
        let loader = Arc::clone(&self.loader);
        let key = path.to_string();
        self.entries
            .get_with(key.clone(), async move { loader.load(&key).await.map(Arc::new) })
            .await
    }
}
