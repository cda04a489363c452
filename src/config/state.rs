// Runtime state module
// Validates the asset tables once at startup and owns the shared services

use std::path::PathBuf;

use crate::assets::{AssetCache, AssetLoader, CacheSpec, OverrideMappings, ResourceMappings};
use crate::config::Config;
use crate::error::ConfigError;
use crate::http::mime::ContentTypeResolver;

/// Mapping used when the configuration declares none, mirroring the
/// classic assets-bundle default.
const DEFAULT_MAPPING: (&str, &str) = ("/assets", "/assets");

/// Shared application state
///
/// Built once before the listener binds; everything in here is immutable
/// afterwards except the cache interior. Construction fails fast on
/// duplicate resource roots or a malformed cache spec.
pub struct AppState {
    pub config: Config,
    pub assets: AssetCache,
    pub content_types: ContentTypeResolver,
    /// Configured `Cache-Control` literal, if any.
    pub cache_control: Option<String>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let assets_config = &config.assets;

        let mappings = if assets_config.mappings.is_empty() {
            ResourceMappings::new([DEFAULT_MAPPING])?
        } else {
            ResourceMappings::new(
                assets_config
                    .mappings
                    .iter()
                    .map(|m| (m.resource_path.as_str(), m.uri_path.as_str())),
            )?
        };
        let overrides = OverrideMappings::new(
            assets_config
                .overrides
                .iter()
                .map(|o| (o.uri_path.as_str(), o.target.as_str())),
        );

        let loader = AssetLoader::new(
            PathBuf::from(&assets_config.resource_dir),
            mappings,
            overrides,
            assets_config.index_file.clone(),
        );

        let spec = CacheSpec::parse(
            assets_config
                .cache_spec
                .as_deref()
                .unwrap_or(crate::assets::DEFAULT_CACHE_SPEC),
        )?;

        let content_types = ContentTypeResolver::new(
            &assets_config.mime_types,
            assets_config.default_charset.as_deref(),
        );

        Ok(Self {
            assets: AssetCache::new(&spec, loader),
            content_types,
            cache_control: assets_config.cache_control_header.clone(),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingEntry;

    fn base_config() -> Config {
        Config::load_from("does_not_exist").unwrap()
    }

    #[test]
    fn test_builds_with_defaults() {
        let state = AppState::new(base_config()).unwrap();
        assert!(state.cache_control.is_none());
    }

    #[test]
    fn test_duplicate_mapping_fails_fast() {
        let mut config = base_config();
        config.assets.mappings = vec![
            MappingEntry {
                resource_path: "/assets".to_string(),
                uri_path: "/a".to_string(),
            },
            MappingEntry {
                resource_path: "assets/".to_string(),
                uri_path: "/b".to_string(),
            },
        ];
        assert!(matches!(
            AppState::new(config),
            Err(ConfigError::DuplicateResourceRoot(_))
        ));
    }

    #[test]
    fn test_bad_cache_spec_fails_fast() {
        let mut config = base_config();
        config.assets.cache_spec = Some("maximumSize=lots".to_string());
        assert!(matches!(
            AppState::new(config),
            Err(ConfigError::InvalidCacheSpec { .. })
        ));
    }
}
