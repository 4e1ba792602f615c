//! Operator settings for engine launches.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Operator-level settings consumed when composing an engine run.
///
/// Loaded once from a TOML file and shared read-only across jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QlSettings {
    /// Engine executable launched for every job.
    pub engine_exe: PathBuf,
    /// Extra arguments passed to the engine executable.
    pub engine_args: Vec<String>,
    /// Base folder under which per-job work folders are allocated.
    pub work_folder: PathBuf,
    /// Market data folder handed to the engine.
    pub data_folder: PathBuf,
    /// Numeric API user id, empty to run anonymously.
    pub api_user: String,
    /// API access token, empty to run anonymously.
    pub api_token: String,
    /// Let the engine download missing data through the API.
    pub api_download: bool,
    /// Environment variables contributed by the language runtime locator,
    /// applied to the child process when a job's algorithm is Python.
    pub runtime_env: BTreeMap<String, String>,
}

impl QlSettings {
    /// Load settings from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_toml(&contents)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        Ok(toml::from_str(value)?)
    }
}
