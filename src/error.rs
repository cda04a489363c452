//! Startup error taxonomy.
//!
//! Configuration problems are fatal: they are reported before the listener
//! binds, never while traffic is being served.

use thiserror::Error;

/// A configuration problem detected while building the runtime state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two mappings normalized to the same resource root.
    #[error("multiple mappings declared for resource root '{0}'")]
    DuplicateResourceRoot(String),

    /// The cache specification string could not be parsed.
    #[error("invalid cache spec '{spec}': {reason}")]
    InvalidCacheSpec { spec: String, reason: String },

    /// The configured listen address is not a valid socket address.
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),
}
