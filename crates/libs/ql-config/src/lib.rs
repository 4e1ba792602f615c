//! Configuration management for the QL launcher.
//!
//! Provides the flat per-job engine configuration and the operator settings
//! file.
//!
//! # Usage
//!
//! ```rust
//! use ql_config::QlJobConfig;
//!
//! let folder = tempfile::tempdir().unwrap();
//! let mut config = QlJobConfig::new();
//! config.set("environment", "backtesting");
//! config.set("live-mode", "false");
//!
//! // Written as indented JSON to config.json inside the folder.
//! config.persist(folder.path()).unwrap();
//! assert_eq!(QlJobConfig::load(folder.path()).unwrap(), config);
//! ```

pub mod error;
pub mod job;
pub mod prelude;
pub mod settings;

pub use job::QlJobConfig;
pub use settings::QlSettings;
