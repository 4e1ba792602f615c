//! Process and work-folder error types.

/// Process supervision and work-folder allocation errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Engine process could not be started.
    #[error("Failed to launch engine process: {0}")]
    Launch(#[source] std::io::Error),

    /// Every work-folder index below the scan bound is already taken.
    #[error("Work folder indexes exhausted")]
    ResourceExhausted,

    /// The run was cancelled before the engine exited.
    #[error("Run cancelled")]
    Cancelled,

    /// `start` was called twice on one handle.
    #[error("Engine process already started")]
    AlreadyStarted,

    /// A wait was requested before `start`.
    #[error("Engine process not started")]
    NotStarted,

    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),
}
