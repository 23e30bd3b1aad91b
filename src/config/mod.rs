//! Configuration loading and validation.
//!
//! A configuration file goes through three stages:
//! 1. **Parse** - the source text (script module, JSON or YAML) becomes a
//!    [`Literal`] tree that keeps key order and duplicate keys
//! 2. **Layer** - presets named under `presets` are loaded and deep-merged
//!    beneath the file
//! 3. **Validate** - the tree is checked against the schema and turned into an
//!    immutable [`ConfigDocument`]
//!
//! ## Environment Variables
//! - `TWCONFIG_CONFIG_PATH` - Explicit config file (skips probing)

mod literal;
mod loader;
mod merge;
mod script;
mod source;
mod types;
mod validate;

pub use literal::Literal;
pub use loader::{CONFIG_FILE_NAMES, CONFIG_PATH_ENV, ConfigLoader, ConfigPaths, LoadOptions};
pub use merge::{deep_merge, deep_merge_all};
pub use script::parse_module;
pub use source::SourceFormat;
pub use types::*;
pub use validate::{RECOGNIZED_KEYS, Validator};
