//! Config commands.

use super::Output;
use crate::config::{ResolvedConfig, RosterConfig};
use crate::store::CascadePolicy;
use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// One resolved setting and where it came from.
#[derive(Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

#[derive(Serialize)]
pub struct ConfigShow {
    pub path: String,
    pub entries: Vec<ConfigEntry>,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("Config file: {}", self.path)];
        for entry in &self.entries {
            lines.push(format!("  {} = {} ({})", entry.key, entry.value, entry.source));
        }
        lines.join("\n")
    }
}

/// Resolved configuration with the source of each value.
pub fn config_show(path: &Path, resolved: &ResolvedConfig) -> Result<ConfigShow> {
    let entry = |key: &str, value: String, source: String| ConfigEntry {
        key: key.to_string(),
        value,
        source,
    };
    let entries = vec![
        entry(
            "output-format",
            resolved.output_format().to_string(),
            resolved.output_format.source.to_string(),
        ),
        entry(
            "data-dir",
            resolved.data_dir().display().to_string(),
            resolved.data_dir.source.to_string(),
        ),
        entry(
            "storage-backend",
            resolved.backend().to_string(),
            resolved.backend.source.to_string(),
        ),
        entry(
            "cascade-membership",
            (resolved.cascade() == CascadePolicy::Prune).to_string(),
            resolved.cascade.source.to_string(),
        ),
    ];
    Ok(ConfigShow {
        path: path.display().to_string(),
        entries,
    })
}

#[derive(Serialize)]
pub struct ConfigSet {
    pub key: String,
    pub value: String,
    pub path: String,
}

impl Output for ConfigSet {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path)
    }
}

/// Set one key in config.kdl, keeping the other keys as they are.
///
/// A file that does not parse or validate is replaced by one holding only the
/// new key, so this command can repair a broken config.
pub fn config_set(path: &Path, key: &str, value: &str) -> Result<ConfigSet> {
    let mut config = match RosterConfig::read(path) {
        Ok(config) => config,
        Err(Error::Config(reason)) => {
            warn!(path = %path.display(), %reason, "replacing unreadable config file");
            RosterConfig::new()
        }
        Err(e) => return Err(e),
    };
    config.set(key, value)?;
    config.write(path)?;
    debug!(key = %key, path = %path.display(), "config updated");
    Ok(ConfigSet {
        key: key.to_string(),
        value: value.to_string(),
        path: path.display().to_string(),
    })
}
