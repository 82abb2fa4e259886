//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The `RosterConfig` struct mirroring the file
//! - Conversion to and from `KdlDocument`
//! - Reading and writing the file, and setting single keys by name

use crate::storage::BackendType;
use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use std::fs;
use std::path::{Path, PathBuf};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys accepted in config.kdl.
pub const CONFIG_KEYS: [&str; 4] = ["output-format", "data-dir", "storage-backend", "cascade-membership"];

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// output-format "human"        // or "json"
/// data-dir "/srv/roster"
/// storage-backend "file"       // or "memory"
/// cascade-membership #true     // prune group memberships when a student is removed
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterConfig {
    pub output_format: Option<OutputFormat>,

    /// Directory holding the stored collections
    pub data_dir: Option<PathBuf>,

    /// Storage backend name ("file" or "memory")
    pub storage_backend: Option<String>,

    /// Remove a student's group memberships when the student is removed
    pub cascade_membership: Option<bool>,
}

fn first_arg(node: &KdlNode) -> Option<&KdlValue> {
    node.entries().first().map(|e| e.value())
}

fn string_node(name: &str, value: String) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value)));
    node
}

impl RosterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(ref backend) = self.storage_backend {
            if BackendType::parse(backend).is_none() {
                return Err(format!("storage-backend must be 'file' or 'memory', got {}", backend));
            }
        }
        if let Some(ref dir) = self.data_dir {
            if dir.as_os_str().is_empty() {
                return Err("data-dir must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Parsed storage backend, if one is configured and valid.
    pub fn backend(&self) -> Option<BackendType> {
        self.storage_backend.as_deref().and_then(BackendType::parse)
    }

    /// Parse config from a KDL document. Unknown nodes and ill-typed values are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(s) = doc.get("output-format").and_then(first_arg).and_then(|v| v.as_string()) {
            config.output_format = OutputFormat::parse(s);
        }

        if let Some(s) = doc.get("data-dir").and_then(first_arg).and_then(|v| v.as_string()) {
            config.data_dir = Some(PathBuf::from(s));
        }

        if let Some(s) = doc.get("storage-backend").and_then(first_arg).and_then(|v| v.as_string()) {
            config.storage_backend = Some(s.to_string());
        }

        if let Some(b) = doc.get("cascade-membership").and_then(first_arg).and_then(|v| v.as_bool()) {
            config.cascade_membership = Some(b);
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(format) = self.output_format {
            doc.nodes_mut().push(string_node("output-format", format.as_str().to_string()));
        }

        if let Some(ref dir) = self.data_dir {
            doc.nodes_mut().push(string_node("data-dir", dir.display().to_string()));
        }

        if let Some(ref backend) = self.storage_backend {
            doc.nodes_mut().push(string_node("storage-backend", backend.clone()));
        }

        if let Some(cascade) = self.cascade_membership {
            let mut node = KdlNode::new("cascade-membership");
            node.push(KdlEntry::new(KdlValue::Bool(cascade)));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Set one key from its string form, as given on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output-format" => {
                let format = OutputFormat::parse(value).ok_or_else(|| {
                    Error::InvalidInput(format!("output-format must be 'json' or 'human', got {}", value))
                })?;
                self.output_format = Some(format);
            }
            "data-dir" => {
                if value.trim().is_empty() {
                    return Err(Error::InvalidInput("data-dir must not be empty".to_string()));
                }
                self.data_dir = Some(PathBuf::from(value));
            }
            "storage-backend" => {
                let backend = BackendType::parse(value).ok_or_else(|| {
                    Error::InvalidInput(format!("storage-backend must be 'file' or 'memory', got {}", value))
                })?;
                self.storage_backend = Some(backend.as_str().to_string());
            }
            "cascade-membership" => {
                let flag = match value.trim().to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => {
                        return Err(Error::InvalidInput(format!(
                            "cascade-membership must be true or false, got {}",
                            value
                        )));
                    }
                };
                self.cascade_membership = Some(flag);
            }
            _ => {
                return Err(Error::InvalidInput(format!(
                    "Unknown config key: {} (expected one of: {})",
                    key,
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Read config from `path`. A missing file yields an empty config.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let doc: KdlDocument = content
            .parse()
            .map_err(|e| {
                Error::Config(format!(
                    "Failed to parse KDL in {}: {} (fix the file or rewrite it with `roster config set`)",
                    path.display(),
                    e
                ))
            })?;
        let config = Self::from_kdl(&doc);
        config
            .validate()
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Write config to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut doc = self.to_kdl();
        doc.autoformat();
        fs::write(path, doc.to_string())?;
        Ok(())
    }
}
