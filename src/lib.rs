//! Roster - A student roster library with house groups and points.
//!
//! This library provides the core functionality for the `roster` CLI tool:
//! student and group stores mirrored to local storage, the derived views
//! computed over them, and the commands that validate and dispatch changes.

pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;
pub mod views;

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::Path;
    use tempfile::TempDir;

    use crate::storage::BackendType;
    use crate::store::{CascadePolicy, Roster};

    /// Test environment with an isolated data directory.
    pub struct TestEnv {
        pub data_dir: TempDir,
    }

    impl TestEnv {
        pub fn new() -> Self {
            Self {
                data_dir: TempDir::new().unwrap(),
            }
        }

        /// Get the path to the isolated data directory.
        pub fn data_path(&self) -> &Path {
            self.data_dir.path()
        }

        /// Open a file-backed roster in this environment.
        pub fn open_roster(&self) -> Roster {
            Roster::open(BackendType::File, self.data_path(), CascadePolicy::Keep)
        }

        /// Open a file-backed roster that prunes memberships on student removal.
        pub fn open_pruning_roster(&self) -> Roster {
            Roster::open(BackendType::File, self.data_path(), CascadePolicy::Prune)
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Library-level error type for roster operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for roster operations.
pub type Result<T> = std::result::Result<T, Error>;
