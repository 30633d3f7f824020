//! Parsing and validation of `busway.toml` scenario files.
//!
//! A scenario names a bridge topology with its construction parameters,
//! simulation settings, and the transactions its master issues. Loading a
//! scenario also resolves the bridge, so every construction-time failure is
//! reported as a [`ConfigError`] before anything is simulated.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use resolve::{resolve_bridge, ResolvedBridge, MAX_MEMORY_WORDS};
pub use types::*;
