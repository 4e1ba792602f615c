//! Job, account and status models for the QL launcher.
//!
//! Data-only crate holding the types callers hand to `ql-launcher` and
//! observe across a run.
//!
//! # Usage
//!
//! ```rust
//! use ql_models::job::QlJob;
//! use ql_models::status::QlJobStatus;
//!
//! let job = QlJob {
//!     name: "Momentum".to_string(),
//!     ..Default::default()
//! };
//! assert_eq!(job.status, QlJobStatus::None);
//! assert!(!job.active);
//! ```

pub mod account;
pub mod job;
pub mod language;
pub mod status;
