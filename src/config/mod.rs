//! Configuration for roster.
//!
//! Preferences live in a KDL file, `~/.config/roster/config.kdl` by default
//! (override the location with `ROSTER_CONFIG`):
//!
//! - `output-format` - "json" or "human"
//! - `data-dir` - where the stored collections live
//! - `storage-backend` - "file" or "memory"
//! - `cascade-membership` - prune group memberships when a student is removed
//!
//! Use the [`resolver`] module for precedence resolution against CLI flags and
//! the environment.

pub mod resolver;
pub mod schema;

pub use resolver::{
    BACKEND_ENV, CONFIG_PATH_ENV, ConfigOverrides, Resolved, ResolvedConfig, ValueSource, config_path,
    resolve_config, resolve_config_with_env,
};
pub use schema::{CONFIG_KEYS, OutputFormat, RosterConfig};
