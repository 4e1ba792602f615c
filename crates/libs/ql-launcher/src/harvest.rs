//! Result artifact harvesting.

use std::io::ErrorKind;
use std::path::Path;

use ql_models::job::QlJob;

use crate::prelude::*;

/// Mapping from an algorithm name to the artifact filenames the engine
/// writes into the work folder.
pub trait ArtifactNaming {
    fn result_file(&self, algorithm_name: &str) -> String;
    fn log_file(&self, algorithm_name: &str) -> String;
}

/// The engine's own convention: `{name}.json` and `{name}-log.txt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineArtifacts;

impl ArtifactNaming for EngineArtifacts {
    fn result_file(&self, algorithm_name: &str) -> String {
        format!("{algorithm_name}.json")
    }

    fn log_file(&self, algorithm_name: &str) -> String {
        format!("{algorithm_name}-log.txt")
    }
}

/// Pick up the result and log artifacts the engine left in `folder`.
///
/// Missing artifacts are normal for aborted and failed runs and leave the
/// corresponding job field untouched.
pub fn post_process(folder: &Path, job: &mut QlJob, naming: &dyn ArtifactNaming) -> Result<()> {
    let result_file = folder.join(naming.result_file(&job.algorithm_name));
    if let Some(result) = read_artifact(&result_file)? {
        job.result = Some(result);
    }

    let log_file = folder.join(naming.log_file(&job.algorithm_name));
    if let Some(logs) = read_artifact(&log_file)? {
        job.logs = Some(logs);
    }
    Ok(())
}

fn read_artifact(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}
