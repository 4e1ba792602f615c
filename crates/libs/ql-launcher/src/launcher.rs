//! End-to-end engine run orchestration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ql_config::{QlJobConfig, QlSettings};
use ql_io::error::Error as ProcessError;
use ql_io::process::EngineProcess;
use ql_io::workdir;
use ql_models::account::QlAccount;
use ql_models::job::QlJob;
use ql_models::language::Language;
use ql_models::status::QlJobStatus;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

use crate::engine_config;
use crate::harvest::{self, ArtifactNaming, EngineArtifacts};
use crate::prelude::*;

/// Runs one engine job end to end: compose the configuration, allocate a
/// work folder, supervise the process, harvest artifacts and classify the
/// terminal status.
///
/// The launcher is stateless across runs and can be shared.
pub struct EngineLauncher {
    naming: Box<dyn ArtifactNaming + Send + Sync>,
    stop_timeout: Option<Duration>,
}

impl Default for EngineLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineLauncher {
    pub fn new() -> Self {
        Self {
            naming: Box::new(EngineArtifacts),
            stop_timeout: None,
        }
    }

    /// Harvest with a different artifact naming convention.
    pub fn with_naming(naming: impl ArtifactNaming + Send + Sync + 'static) -> Self {
        Self {
            naming: Box::new(naming),
            stop_timeout: None,
        }
    }

    /// Override the graceful and forced stop window applied when a run is
    /// cancelled.
    pub fn stop_timeout(&mut self, timeout: Duration) {
        self.stop_timeout = Some(timeout);
    }

    /// Run `job` to completion.
    ///
    /// The caller observes the run through the job itself: `active` is true
    /// exactly while the run owns an engine process, and `status` is written
    /// once with the outcome - `Success` for a clean exit, `Error` as soon
    /// as the engine wrote a single stderr line or the run failed, `Abort`
    /// when `cancel` stopped the engine. A job whose configuration is
    /// rejected never becomes active and keeps status `None`.
    pub async fn run(
        &self,
        job: &mut QlJob,
        account: Option<&QlAccount>,
        settings: &QlSettings,
        cancel: CancellationToken,
    ) {
        debug_assert_eq!(job.status, QlJobStatus::None);

        let config = match engine_config::compose(job, account, settings) {
            Ok(config) => config,
            Err(err) => {
                error!("{} - Engine configuration rejected: {err}", job.name);
                return;
            }
        };

        let error_seen = Arc::new(AtomicBool::new(false));
        job.active = true;
        let outcome = self
            .supervise(job, &config, settings, cancel, Arc::clone(&error_seen))
            .await;
        job.status = match outcome {
            Ok(()) if error_seen.load(Ordering::Relaxed) => QlJobStatus::Error,
            Ok(()) => QlJobStatus::Success,
            Err(Error::Process(ProcessError::Cancelled)) => QlJobStatus::Abort,
            Err(err) => {
                error!("{} - Engine run failed: {err}", job.name);
                QlJobStatus::Error
            }
        };
        job.active = false;
        info!("{} - Finished with status {:?}", job.name, job.status);
    }

    async fn supervise(
        &self,
        job: &mut QlJob,
        config: &QlJobConfig,
        settings: &QlSettings,
        cancel: CancellationToken,
        error_seen: Arc<AtomicBool>,
    ) -> Result<()> {
        let work_folder = workdir::allocate(&settings.work_folder, true)?;

        let output_name = job.name.clone();
        let error_name = job.name.clone();
        let mut process = EngineProcess::new(
            &settings.engine_exe,
            settings.engine_args.clone(),
            work_folder,
            move |line| trace!("{output_name} - {line}"),
            move |line| {
                error_seen.store(true, Ordering::Relaxed);
                error!("{error_name} - {line}");
            },
        );
        config.persist(process.work_folder())?;
        if let Some(timeout) = self.stop_timeout {
            process.stop_timeout(timeout);
        }
        if job.algorithm_language == Language::Python {
            for (key, value) in &settings.runtime_env {
                process.env(key.clone(), value.clone());
            }
        }

        process.start()?;
        let naming = self.naming.as_ref();
        process
            .wait_for_exit(cancel, |folder| {
                if let Err(err) = harvest::post_process(folder, job, naming) {
                    warn!("{} - Harvesting failed: {err}", job.name);
                }
            })
            .await?;
        Ok(())
    }
}
