//! End-to-end supervision tests driving stub engine executables.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nix::sys::signal::kill;
use nix::unistd::Pid;
use ql_io::controller::KillController;
use ql_io::error::Error;
use ql_io::process::EngineProcess;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Couldn't write stub");
    let mut perms = fs::metadata(&path).expect("Couldn't stat stub").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("Couldn't chmod stub");
    path
}

fn collector() -> (Arc<Mutex<Vec<String>>>, impl Fn(String) + Send + 'static) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink_lines = Arc::clone(&lines);
    let sink = move |line| sink_lines.lock().expect("Poisoned collector").push(line);
    (lines, sink)
}

fn cancel_after(cancel: &CancellationToken, delay: Duration) {
    let requester = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        requester.cancel();
    });
}

fn assert_not_running(pid: u32) {
    assert!(
        kill(Pid::from_raw(pid as i32), None).is_err(),
        "Engine process {pid} is still running"
    );
}

#[tokio::test]
async fn forwards_stdout_and_stderr_lines() {
    let dir = tempdir().expect("Couldn't create temp dir");
    let stub = write_stub(dir.path(), "engine.sh", "echo one\necho two\necho oops >&2");
    let (out_lines, out_sink) = collector();
    let (err_lines, err_sink) = collector();

    let mut process = EngineProcess::new(&stub, Vec::new(), dir.path(), out_sink, err_sink);
    process.start().expect("Couldn't start stub engine");
    let status = process
        .wait_for_exit(CancellationToken::new(), |_| {})
        .await
        .expect("Wait failed");

    assert!(status.success());
    assert_eq!(
        *out_lines.lock().expect("Poisoned collector"),
        vec!["one".to_string(), "two".to_string()]
    );
    assert_eq!(
        *err_lines.lock().expect("Poisoned collector"),
        vec!["oops".to_string()]
    );
}

#[tokio::test]
async fn post_process_runs_after_natural_exit() {
    let dir = tempdir().expect("Couldn't create temp dir");
    let stub = write_stub(dir.path(), "engine.sh", "exit 0");

    let mut process = EngineProcess::new(&stub, Vec::new(), dir.path(), |_| {}, |_| {});
    assert_eq!(process.work_folder(), dir.path());
    process.start().expect("Couldn't start stub engine");

    let mut harvested = None;
    let status = process
        .wait_for_exit(CancellationToken::new(), |folder| {
            harvested = Some(folder.to_path_buf());
        })
        .await
        .expect("Wait failed");

    assert!(status.success());
    // The callback receives the same folder the handle reports.
    assert_eq!(harvested.as_deref(), Some(process.work_folder()));
    assert_eq!(harvested.as_deref(), Some(dir.path()));
}

#[tokio::test]
async fn non_utf8_output_keeps_lines_flowing() {
    let dir = tempdir().expect("Couldn't create temp dir");
    // Raw bytes on either pipe must not end forwarding; later lines still
    // reach the sinks, decoded lossily.
    let stub = write_stub(
        dir.path(),
        "engine.sh",
        "printf 'a\\377b\\n'\nprintf '\\376\\n' >&2\necho tail >&2",
    );
    let (out_lines, out_sink) = collector();
    let (err_lines, err_sink) = collector();

    let mut process = EngineProcess::new(&stub, Vec::new(), dir.path(), out_sink, err_sink);
    process.start().expect("Couldn't start stub engine");
    let status = process
        .wait_for_exit(CancellationToken::new(), |_| {})
        .await
        .expect("Wait failed");
    assert!(status.success());

    assert_eq!(
        *out_lines.lock().expect("Poisoned collector"),
        vec![format!("a{}b", char::REPLACEMENT_CHARACTER)]
    );
    let errs = err_lines.lock().expect("Poisoned collector");
    assert_eq!(errs.len(), 2, "Lines after a raw byte were dropped");
    assert_eq!(errs[0], char::REPLACEMENT_CHARACTER.to_string());
    assert_eq!(errs[1], "tail");
}

#[tokio::test]
async fn injected_controller_replaces_platform_stop() {
    let dir = tempdir().expect("Couldn't create temp dir");
    // With the portable controller the graceful stop is already a kill, so
    // an interrupt-ignoring stub dies inside the first window. No process
    // group here, hence the exec: the signal reaches only the child itself.
    let stub = write_stub(dir.path(), "engine.sh", "trap '' INT TERM\nexec sleep 30");

    let mut process = EngineProcess::new(&stub, Vec::new(), dir.path(), |_| {}, |_| {});
    process.controller(Box::new(KillController));
    process.stop_timeout(Duration::from_millis(500));
    process.start().expect("Couldn't start stub engine");
    let pid = process.id().expect("Engine has no pid");

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = process.wait_for_exit(cancel, |_| {}).await;
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_not_running(pid);
}

#[tokio::test]
async fn lines_arrive_while_engine_runs() {
    let dir = tempdir().expect("Couldn't create temp dir");
    let stub = write_stub(dir.path(), "engine.sh", "echo started\nsleep 30");
    let (out_lines, out_sink) = collector();

    let mut process = EngineProcess::new(&stub, Vec::new(), dir.path(), out_sink, |_| {});
    process.stop_timeout(Duration::from_millis(500));
    process.start().expect("Couldn't start stub engine");

    // The first line lands before the engine is anywhere near exiting.
    let mut waited = Duration::ZERO;
    while out_lines.lock().expect("Poisoned collector").is_empty() {
        assert!(waited < Duration::from_secs(5), "No output from stub engine");
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = process.wait_for_exit(cancel, |_| {}).await;
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn cancel_interrupts_engine() {
    let dir = tempdir().expect("Couldn't create temp dir");
    let stub = write_stub(dir.path(), "engine.sh", "sleep 30");

    let mut process = EngineProcess::new(&stub, Vec::new(), dir.path(), |_| {}, |_| {});
    process.stop_timeout(Duration::from_millis(500));
    process.start().expect("Couldn't start stub engine");
    let pid = process.id().expect("Engine has no pid");

    let cancel = CancellationToken::new();
    cancel_after(&cancel, Duration::from_millis(200));

    let mut harvested = false;
    let result = process.wait_for_exit(cancel, |_| harvested = true).await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(harvested, "Post-process skipped on cancellation");
    assert_not_running(pid);
}

#[tokio::test]
async fn forced_kill_after_ignored_interrupt() {
    let dir = tempdir().expect("Couldn't create temp dir");
    // Ignored signal dispositions are inherited, so the whole stub process
    // group shrugs off the interrupt and only dies on the kill.
    let stub = write_stub(dir.path(), "engine.sh", "trap '' INT TERM\nsleep 30");

    let mut process = EngineProcess::new(&stub, Vec::new(), dir.path(), |_| {}, |_| {});
    process.stop_timeout(Duration::from_millis(300));
    process.start().expect("Couldn't start stub engine");
    let pid = process.id().expect("Engine has no pid");

    let cancel = CancellationToken::new();
    cancel_after(&cancel, Duration::from_millis(200));

    let result = process.wait_for_exit(cancel, |_| {}).await;
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_not_running(pid);
}
