//! Job completion lifecycle.

use serde::{Deserialize, Serialize};

/// Terminal classification of one job run.
///
/// A job starts at `None` and receives exactly one terminal value after the
/// run finishes. A job that fails validation before launch keeps `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QlJobStatus {
    /// Not started, or rejected before launch.
    #[default]
    None,
    /// Engine exited without writing to stderr.
    Success,
    /// Engine wrote to stderr, or the run itself failed.
    Error,
    /// The caller cancelled the run.
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_jobs_are_unclassified() {
        assert_eq!(QlJobStatus::default(), QlJobStatus::None);
    }
}
