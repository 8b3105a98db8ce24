//! Configuration model and loading
//!
//! The configuration is a single JSON document validated once at the
//! boundary; everything past [`load_config`] works with a [`SyncConfig`]
//! that is known to be well-formed.

mod loader;
mod schema;

pub use loader::{config_path, load_config, parse_config};
pub use schema::{HooksConfig, LinkMode, SyncConfig};
