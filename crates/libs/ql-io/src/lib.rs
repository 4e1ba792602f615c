//! Process execution and work-folder management for the QL launcher.
//!
//! Provides the engine process supervisor (spawn, line-oriented output
//! forwarding, cancellation with graceful-then-forced stop) and the
//! allocator for isolated per-job work folders.
//!
//! # Usage
//!
//! ```rust
//! use ql_io::process::EngineProcess;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut process = EngineProcess::new(
//!         "echo",
//!         vec!["ready".to_string()],
//!         ".",
//!         |line| println!("engine: {line}"),
//!         |line| eprintln!("engine: {line}"),
//!     );
//!     process.start().unwrap();
//!
//!     let status = process
//!         .wait_for_exit(CancellationToken::new(), |_folder| {})
//!         .await
//!         .unwrap();
//!     assert!(status.success());
//! }
//! ```

pub mod controller;
pub mod error;
pub mod prelude;
pub mod process;
pub mod workdir;
