//! Asset resolution and caching
//!
//! The path from a request path to servable bytes: mapping tables decide
//! which root a path belongs to, the loader resolves overrides and the
//! resource tree, and the cache memoizes whatever the loader produced.

pub mod asset;
pub mod cache;
pub mod loader;
pub mod mapping;

// Re-export public types
pub use asset::{Asset, AssetSnapshot};
pub use cache::{AssetCache, CacheSpec, DEFAULT_CACHE_SPEC};
pub use loader::AssetLoader;
pub use mapping::{OverrideMappings, ResourceMappings};
