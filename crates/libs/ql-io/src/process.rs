//! Engine process supervision.
//!
//! [`EngineProcess`] owns exactly one external engine run: spawn with piped
//! stdout/stderr, line-oriented forwarding into caller sinks, exit waiting
//! with cooperative cancellation, and a graceful-then-forced stop ladder.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::controller::{self, ProcessController};
use crate::prelude::*;

/// Time allowed for a graceful stop before escalating to a kill, and again
/// for the kill itself.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Callback receiving one output line at a time.
///
/// Sinks run on the pipe reader tasks, off the caller's own thread of
/// control; callers needing to touch UI state marshal themselves.
pub type LineSink = Box<dyn Fn(String) + Send + 'static>;

/// Supervises one engine child process.
///
/// At most one OS process ever runs per handle: [`start`](Self::start) may
/// be called once, and a handle whose process exited cannot be restarted.
/// Dropping the handle releases the OS process handle without stopping a
/// still-running engine.
pub struct EngineProcess {
    program: PathBuf,
    args: Vec<String>,
    work_folder: PathBuf,
    envs: BTreeMap<String, String>,
    stop_timeout: Duration,
    controller: Box<dyn ProcessController>,
    output: Option<LineSink>,
    error: Option<LineSink>,
    child: Option<Child>,
    readers: Vec<JoinHandle<()>>,
    started: bool,
}

impl EngineProcess {
    /// Create a handle for one engine run.
    ///
    /// `output` receives every stdout line, `error` every stderr line, as
    /// they arrive. The child runs inside `work_folder`, which must already
    /// exist when `start` is called.
    pub fn new(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        work_folder: impl Into<PathBuf>,
        output: impl Fn(String) + Send + 'static,
        error: impl Fn(String) + Send + 'static,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            work_folder: work_folder.into(),
            envs: BTreeMap::new(),
            stop_timeout: STOP_TIMEOUT,
            controller: controller::platform(),
            output: Some(Box::new(output)),
            error: Some(Box::new(error)),
            child: None,
            readers: Vec::new(),
            started: false,
        }
    }

    /// Add or override one environment variable for the child.
    pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.envs.insert(key.into(), value.into());
    }

    /// Override the graceful and forced stop window used by
    /// [`abort`](Self::abort).
    pub fn stop_timeout(&mut self, timeout: Duration) {
        self.stop_timeout = timeout;
    }

    /// Replace the platform process controller.
    pub fn controller(&mut self, controller: Box<dyn ProcessController>) {
        self.controller = controller;
    }

    /// Working folder the child runs in.
    pub fn work_folder(&self) -> &Path {
        &self.work_folder
    }

    /// OS process id, while the child has not been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Launch the engine process.
    ///
    /// Spawns the child with piped stdout/stderr inside the work folder, in
    /// its own process group at below-normal scheduling priority, and begins
    /// forwarding output lines to the sinks.
    ///
    /// # Returns
    ///
    /// `Error::Launch` when the executable cannot be started, and
    /// `Error::AlreadyStarted` on any second call, including after a failed
    /// launch.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(Error::AlreadyStarted);
        }
        self.started = true;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.work_folder)
            .envs(&self.envs)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        self.controller.prepare(&mut cmd);

        let mut child = cmd.spawn().map_err(Error::Launch)?;
        info!(
            "{} - Engine started (pid {:?})",
            self.program.display(),
            child.id()
        );

        if let (Some(stdout), Some(sink)) = (child.stdout.take(), self.output.take()) {
            self.readers.push(forward_lines(stdout, sink));
        }
        if let (Some(stderr), Some(sink)) = (child.stderr.take(), self.error.take()) {
            self.readers.push(forward_lines(stderr, sink));
        }

        self.child = Some(child);
        Ok(())
    }

    /// Wait until the engine exits or `cancel` fires.
    ///
    /// On natural exit the pipe readers are drained first, so the sinks have
    /// seen every line by the time `post_process` runs once with the work
    /// folder, and the exit status is returned. On cancellation
    /// [`abort`](Self::abort) runs, then `post_process`, then
    /// `Error::Cancelled` is returned so the caller can record the aborted
    /// run. `post_process` runs exactly once per call either way.
    pub async fn wait_for_exit<F>(
        &mut self,
        cancel: CancellationToken,
        post_process: F,
    ) -> Result<ExitStatus>
    where
        F: FnOnce(&Path),
    {
        let child = self.child.as_mut().ok_or(Error::NotStarted)?;
        let waited = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancel.cancelled() => None,
        };

        let result = match waited {
            Some(Ok(status)) => {
                self.join_readers().await;
                info!("{} - Engine exited with {status}", self.program.display());
                Ok(status)
            }
            Some(Err(err)) => Err(Error::IO(err)),
            None => {
                if self.abort().await {
                    self.join_readers().await;
                }
                Err(Error::Cancelled)
            }
        };

        post_process(&self.work_folder);
        result
    }

    /// Stop the engine, gracefully first.
    ///
    /// Delivers a cooperative interrupt and waits up to the stop timeout; if
    /// the engine is still running, kills it and waits the same window
    /// again. Returns whether the engine is known to have stopped. A `false`
    /// return means the OS process may still be alive and is left to
    /// operator intervention; callers record the run as aborted regardless.
    pub async fn abort(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return true;
        };
        if matches!(child.try_wait(), Ok(Some(_))) {
            return true;
        }

        if let Err(err) = self.controller.interrupt(child) {
            error!(
                "{} - Failed to interrupt engine: {err}",
                self.program.display()
            );
            return false;
        }
        if timed_wait(child, self.stop_timeout).await {
            info!("{} - Engine stopped on interrupt", self.program.display());
            return true;
        }

        warn!(
            "{} - Engine ignored interrupt for {:?}, killing",
            self.program.display(),
            self.stop_timeout
        );
        if let Err(err) = self.controller.kill(child) {
            error!("{} - Failed to kill engine: {err}", self.program.display());
            return false;
        }
        if timed_wait(child, self.stop_timeout).await {
            return true;
        }

        error!(
            "{} - Engine still running after forced kill",
            self.program.display()
        );
        false
    }

    async fn join_readers(&mut self) {
        for reader in self.readers.drain(..) {
            let _ = reader.await;
        }
    }
}

async fn timed_wait(child: &mut Child, timeout: Duration) -> bool {
    matches!(tokio::time::timeout(timeout, child.wait()).await, Ok(Ok(_)))
}

fn forward_lines<R>(stream: R, sink: LineSink) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                // Engine output is not guaranteed to be UTF-8; decode
                // lossily so a raw byte cannot end forwarding early.
                Ok(n) if n > 0 => {
                    let mut line = String::from_utf8_lossy(&buf).into_owned();
                    if line.ends_with('\n') {
                        line.pop();
                        if line.ends_with('\r') {
                            line.pop();
                        }
                    }
                    sink(line);
                }
                Ok(_) | Err(_) => break,
            }
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn quiet() -> impl Fn(String) + Send + 'static {
        |_line| {}
    }

    #[tokio::test]
    async fn wait_before_start_fails() {
        let mut process = EngineProcess::new("true", Vec::new(), ".", quiet(), quiet());
        let result = process
            .wait_for_exit(CancellationToken::new(), |_| {})
            .await;
        assert!(matches!(result, Err(Error::NotStarted)));
    }

    #[tokio::test]
    async fn start_is_single_shot() {
        let mut process = EngineProcess::new(
            "definitely-not-an-engine",
            Vec::new(),
            ".",
            quiet(),
            quiet(),
        );
        assert!(matches!(process.start(), Err(Error::Launch(_))));
        assert!(matches!(process.start(), Err(Error::AlreadyStarted)));
    }

    #[tokio::test]
    async fn abort_without_child_reports_stopped() {
        let mut process = EngineProcess::new("true", Vec::new(), ".", quiet(), quiet());
        assert!(process.abort().await);
    }
}
