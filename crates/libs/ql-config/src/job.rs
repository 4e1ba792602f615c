//! Flat engine configuration persisted per job.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prelude::*;

/// Filename the engine reads its configuration from.
pub const CONFIG_FILE: &str = "config.json";

/// Flat string-to-string configuration for one engine run.
///
/// Built fresh per job, persisted into the job's work folder before the
/// engine starts, and not mutated afterwards. Every value is a flat scalar;
/// nested structure is encoded by the caller into a single string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QlJobConfig {
    entries: BTreeMap<String, String>,
}

impl QlJobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one configuration key, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Iterate the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the configuration as indented JSON to [`CONFIG_FILE`] inside
    /// `folder`, replacing any previous file.
    pub fn persist(&self, folder: &Path) -> Result<PathBuf> {
        let path = folder.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&path, json)?;
        debug!("Wrote engine configuration to {}", path.display());
        Ok(path)
    }

    /// Read a previously persisted configuration back from `folder`.
    pub fn load(folder: &Path) -> Result<Self> {
        let text = fs::read_to_string(folder.join(CONFIG_FILE))?;
        Ok(serde_json::from_str(&text)?)
    }
}
