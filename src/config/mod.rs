// Configuration module entry point
// Loads layered configuration and derives the immutable runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ConfigError;

// Re-export public types
pub use state::AppState;
pub use types::{
    AssetsConfig, Config, LoggingConfig, MappingEntry, OverrideEntry, PerformanceConfig,
    ServerConfig,
};

impl Config {
    /// Load configuration from the default `config.toml` location.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the specified file path (without extension),
    /// layered under `ASSETSERVE_*` environment variables and built-in
    /// defaults. The file is optional.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("ASSETSERVE"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("assets.resource_dir", "assets")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let address = format!("{}:{}", self.server.host, self.server.port);
        address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_a_file() {
        let config = Config::load_from("does_not_exist").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.access_log_format, "combined");
        assert_eq!(config.assets.resource_dir, "assets");
        assert!(config.assets.mappings.is_empty());
        assert!(config.assets.cache_control_header.is_none());
    }

    #[test]
    fn test_socket_addr_rejects_bad_host() {
        let mut config = Config::load_from("does_not_exist").unwrap();
        config.server.host = "not a host".to_string();
        assert!(config.socket_addr().is_err());
    }
}
