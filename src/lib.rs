//! Configurable static asset server
//!
//! Serves byte content over HTTP with conditional-request support, single-
//! and multi-range retrieval, and a memoizing cache of resolved assets.
//! Request paths resolve through an ordered table of resource mappings;
//! configured filesystem overrides take precedence and auto-refresh when
//! their backing file changes, which keeps edit-and-reload development
//! flows working without a rebuild.

pub mod assets;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
