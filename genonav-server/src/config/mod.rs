//! Configuration management for the genonav daemon
//!
//! Configuration is read once at startup and shared read-only.

mod defaults;
mod loader;
mod schema;

pub use defaults::DEFAULT_CONFIG_TOML;
pub use loader::ConfigLoader;
pub use schema::*;
