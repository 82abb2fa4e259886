//! Common test utilities for roster integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/roster/` directory or their config.kdl.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// Each `TestEnv` creates two temporary directories:
/// - `data_dir`: Holds the stored collections (via `ROSTER_DATA_DIR`)
/// - `config_dir`: Holds config.kdl (via `ROSTER_CONFIG`)
///
/// The `roster()` method sets both variables per-invocation, making tests
/// parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the roster binary with isolated data and config.
    pub fn roster(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_roster"));
        cmd.env("ROSTER_DATA_DIR", self.data_dir.path());
        cmd.env("ROSTER_CONFIG", self.config_path());
        cmd.env_remove("ROSTER_BACKEND");
        cmd.env_remove("ROSTER_LOG");
        cmd
    }

    /// Run roster with `args`, assert success, and parse stdout as JSON.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self.roster().args(args).assert().success().get_output().stdout.clone();
        serde_json::from_slice(&output).unwrap()
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Get the path to the config file (may not exist yet).
    pub fn config_path(&self) -> std::path::PathBuf {
        self.config_dir.path().join("config.kdl")
    }

    /// Read a stored collection file as JSON.
    pub fn stored(&self, key: &str) -> Value {
        let raw = std::fs::read_to_string(self.data_path().join(format!("{}.json", key))).unwrap();
        serde_json::from_str(&raw).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Ids of the objects in a JSON array, in order.
pub fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}
