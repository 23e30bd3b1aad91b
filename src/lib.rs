//! Utility-CSS configuration loader.
//!
//! Loads the configuration file of a utility-class CSS tool (content globs,
//! theme color extensions, plugins), validates it, and exposes it read-only
//! to the styling engine that consumes it.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;

pub use config::ConfigDocument;
pub use error::{ConfigError, ConfigResult};
