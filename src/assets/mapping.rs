//! Mapping tables for the asset resolver
//!
//! Two start-up-immutable tables drive resolution: resource mappings tie a
//! root inside the resource tree to the uri prefix it is served under, and
//! overrides redirect a uri prefix to a live filesystem path. Declaration
//! order is matching order for both.

use std::path::PathBuf;

use crate::error::ConfigError;

/// One normalized (resource root, uri root) pair.
///
/// The resource root has no leading slash and a single trailing slash
/// (empty means the resource-tree root); the uri root has a leading slash
/// and no trailing slash (`/` when empty). `/static` therefore matches
/// both `/static` and `/static/...` requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMapping {
    pub resource_root: String,
    pub uri_root: String,
}

/// Ordered, validated resource mapping table.
#[derive(Debug, Clone, Default)]
pub struct ResourceMappings {
    mappings: Vec<ResourceMapping>,
}

impl ResourceMappings {
    /// Normalize and validate raw (resource path, uri path) pairs.
    ///
    /// Construction fails when two entries normalize to the same resource
    /// root; serving would otherwise silently shadow one of them.
    pub fn new<'a, I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut mappings: Vec<ResourceMapping> = Vec::new();
        for (resource_path, uri_path) in pairs {
            let resource_root = normalize_resource_root(resource_path);
            let uri_root = normalize_uri_root(uri_path);
            if mappings.iter().any(|m| m.resource_root == resource_root) {
                return Err(ConfigError::DuplicateResourceRoot(resource_root));
            }
            mappings.push(ResourceMapping {
                resource_root,
                uri_root,
            });
        }
        Ok(Self { mappings })
    }

    /// First declared mapping whose uri root is a prefix of the request
    /// path. The match is the commit point: resolution does not fall
    /// through to later mappings if it fails under this one.
    pub fn matching(&self, path: &str) -> Option<&ResourceMapping> {
        self.mappings.iter().find(|m| path.starts_with(&m.uri_root))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceMapping> {
        self.mappings.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn normalize_resource_root(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

fn normalize_uri_root(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// One (uri prefix, filesystem path) override pair, kept as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideMapping {
    pub uri_prefix: String,
    pub target: PathBuf,
}

/// Ordered override table.
#[derive(Debug, Clone, Default)]
pub struct OverrideMappings {
    overrides: Vec<OverrideMapping>,
}

impl OverrideMappings {
    pub fn new<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            overrides: pairs
                .into_iter()
                .map(|(uri_prefix, target)| OverrideMapping {
                    uri_prefix: uri_prefix.to_string(),
                    target: PathBuf::from(target),
                })
                .collect(),
        }
    }

    /// Filesystem candidates for a request path.
    ///
    /// An exact match of the whole path maps to the override target itself
    /// and outranks every prefix match; prefix matches map the remainder
    /// under the target directory. Within each class, declaration order is
    /// preserved. Existence and directory handling are the resolver's job.
    pub fn candidates(&self, path: &str) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        for mapping in &self.overrides {
            if mapping.uri_prefix == path {
                candidates.push(mapping.target.clone());
            }
        }
        for mapping in &self.overrides {
            if mapping.uri_prefix != path {
                if let Some(rest) = path.strip_prefix(&mapping.uri_prefix) {
                    candidates.push(mapping.target.join(rest.trim_start_matches('/')));
                }
            }
        }
        candidates
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_resource_roots() {
        let mappings = ResourceMappings::new([("/assets/", "/static")]).unwrap();
        let mapping = mappings.iter().next().unwrap();
        assert_eq!(mapping.resource_root, "assets/");
        assert_eq!(mapping.uri_root, "/static");
    }

    #[test]
    fn test_empty_roots_default() {
        let mappings = ResourceMappings::new([("/", "")]).unwrap();
        let mapping = mappings.iter().next().unwrap();
        assert_eq!(mapping.resource_root, "");
        assert_eq!(mapping.uri_root, "/");
    }

    #[test]
    fn test_uri_root_gains_leading_slash() {
        let mappings = ResourceMappings::new([("assets", "static/")]).unwrap();
        assert_eq!(mappings.iter().next().unwrap().uri_root, "/static");
    }

    #[test]
    fn test_duplicate_resource_roots_rejected() {
        let result = ResourceMappings::new([("/assets", "/a"), ("assets/", "/b")]);
        assert!(matches!(
            result,
            Err(ConfigError::DuplicateResourceRoot(root)) if root == "assets/"
        ));
    }

    #[test]
    fn test_first_prefix_match_wins() {
        let mappings =
            ResourceMappings::new([("/assets", "/static"), ("/other", "/static/nested")]).unwrap();
        let hit = mappings.matching("/static/nested/file.txt").unwrap();
        assert_eq!(hit.resource_root, "assets/");
    }

    #[test]
    fn test_matching_covers_bare_uri_root() {
        let mappings = ResourceMappings::new([("/assets", "/static/")]).unwrap();
        assert!(mappings.matching("/static").is_some());
        assert!(mappings.matching("/static/file.txt").is_some());
        assert!(mappings.matching("/elsewhere").is_none());
    }

    #[test]
    fn test_root_mapping_matches_everything() {
        let mappings = ResourceMappings::new([("/", "/")]).unwrap();
        assert!(mappings.matching("/anything/at/all").is_some());
    }

    #[test]
    fn test_override_candidates_exact_before_prefix() {
        let overrides = OverrideMappings::new([
            ("/static/js", "/tmp/js_dir"),
            ("/static", "/tmp/static_dir"),
        ]);
        let candidates = overrides.candidates("/static/js");
        assert_eq!(candidates[0], PathBuf::from("/tmp/js_dir"));
        // The prefix form of the same path comes after the exact match.
        assert_eq!(candidates[1], PathBuf::from("/tmp/static_dir/js"));
    }

    #[test]
    fn test_override_prefix_remainder_joins_relative() {
        let overrides = OverrideMappings::new([("/static", "/tmp/dev")]);
        let candidates = overrides.candidates("/static/css/site.css");
        assert_eq!(candidates, vec![PathBuf::from("/tmp/dev/css/site.css")]);
    }

    #[test]
    fn test_override_no_match() {
        let overrides = OverrideMappings::new([("/static", "/tmp/dev")]);
        assert!(overrides.candidates("/images/logo.png").is_empty());
    }
}
