//! Platform-specific process control.

use std::io;

use tokio::process::{Child, Command};

/// OS-level control operations for one engine child, kept behind a trait so
/// the supervision state machine stays platform-neutral.
pub trait ProcessController: Send + Sync {
    /// Configure a command before it is spawned.
    fn prepare(&self, cmd: &mut Command);

    /// Deliver a cooperative stop request the child can handle and exit on.
    fn interrupt(&self, child: &mut Child) -> io::Result<()>;

    /// Terminate the child unconditionally.
    fn kill(&self, child: &mut Child) -> io::Result<()>;
}

/// Below-normal scheduling priority, so the hosting application stays
/// responsive while an engine churns.
#[cfg(unix)]
const BELOW_NORMAL_NICE: libc::c_int = 10;

/// Signal-based controller for Unix-likes.
///
/// The child is moved into its own process group at spawn. Interrupt is a
/// `SIGINT` to that group, matching what the engine receives on a Ctrl-C in
/// an interactive console, and kill is a `SIGKILL` to the same group so
/// engine subprocesses go down with it.
#[cfg(unix)]
pub struct SignalController;

#[cfg(unix)]
impl ProcessController for SignalController {
    fn prepare(&self, cmd: &mut Command) {
        unsafe {
            cmd.pre_exec(|| {
                libc::setpgid(0, 0);
                libc::nice(BELOW_NORMAL_NICE);
                Ok(())
            });
        }
    }

    fn interrupt(&self, child: &mut Child) -> io::Result<()> {
        signal_group(child, nix::sys::signal::Signal::SIGINT)
    }

    fn kill(&self, child: &mut Child) -> io::Result<()> {
        signal_group(child, nix::sys::signal::Signal::SIGKILL)
    }
}

#[cfg(unix)]
fn signal_group(child: &Child, signal: nix::sys::signal::Signal) -> io::Result<()> {
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        // Already reaped, nothing left to signal.
        return Ok(());
    };
    nix::sys::signal::killpg(Pid::from_raw(pid as i32), signal)
        .map_err(|errno| io::Error::from_raw_os_error(errno as i32))
}

/// Portable fallback without process groups or scheduling priority.
///
/// Interrupt and kill both terminate the child directly, so a graceful stop
/// degrades to a forced one.
pub struct KillController;

impl ProcessController for KillController {
    fn prepare(&self, _cmd: &mut Command) {}

    fn interrupt(&self, child: &mut Child) -> io::Result<()> {
        child.start_kill()
    }

    fn kill(&self, child: &mut Child) -> io::Result<()> {
        child.start_kill()
    }
}

/// Controller for the current platform.
pub fn platform() -> Box<dyn ProcessController> {
    #[cfg(unix)]
    {
        Box::new(SignalController)
    }
    #[cfg(not(unix))]
    {
        Box::new(KillController)
    }
}
