// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub assets: AssetsConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<usize>,
}

/// Asset serving configuration
///
/// All tables are optional. Declaration order of `mappings` and
/// `overrides` is matching order, so both are lists rather than maps.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AssetsConfig {
    /// Base directory holding the bundled resource roots.
    #[serde(default = "default_resource_dir")]
    pub resource_dir: String,
    /// Filename served for directory requests; directories 404 without it.
    #[serde(default)]
    pub index_file: Option<String>,
    /// Cache specification string, e.g. `maximumWeight=10485760`.
    /// Falls back to the built-in default when absent.
    #[serde(default)]
    pub cache_spec: Option<String>,
    /// Literal `Cache-Control` value; the header is omitted when absent.
    #[serde(default)]
    pub cache_control_header: Option<String>,
    /// Charset appended to text content types.
    #[serde(default)]
    pub default_charset: Option<String>,
    /// Resource root to uri root mappings, in declaration order.
    #[serde(default)]
    pub mappings: Vec<MappingEntry>,
    /// Uri prefix to filesystem path overrides, in declaration order.
    #[serde(default)]
    pub overrides: Vec<OverrideEntry>,
    /// File extension to media type overrides.
    #[serde(default)]
    pub mime_types: HashMap<String, String>,
}

fn default_resource_dir() -> String {
    "assets".to_string()
}

/// One resource mapping declaration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub resource_path: String,
    pub uri_path: String,
}

/// One override declaration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub uri_path: String,
    pub target: String,
}
