//! Engine launch orchestration for QL.
//!
//! Composes the engine configuration for a job, isolates the run in a work
//! folder, supervises the engine process, harvests result artifacts and
//! classifies the final job status.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ql_config::QlSettings;
//! use ql_launcher::launcher::EngineLauncher;
//! use ql_models::job::QlJob;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = QlSettings::from_file(std::path::Path::new("settings.toml")).unwrap();
//!     let mut job = QlJob {
//!         name: "Momentum".to_string(),
//!         algorithm_name: "Momentum".to_string(),
//!         account: "Backtest".to_string(),
//!         ..Default::default()
//!     };
//!
//!     EngineLauncher::new()
//!         .run(&mut job, None, &settings, CancellationToken::new())
//!         .await;
//!     println!("finished with {:?}", job.status);
//! }
//! ```

pub mod engine_config;
pub mod error;
pub mod harvest;
pub mod launcher;
pub mod prelude;

pub use launcher::EngineLauncher;
