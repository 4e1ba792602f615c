//! Work-folder allocation for isolated job runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::prelude::*;

/// Upper bound on `temp{N}` suffixes scanned before giving up.
pub const MAX_INDEX: usize = 65536;

// Scans are serialized process-wide so two concurrent jobs can never observe
// the same free index.
static LOCK: Mutex<()> = Mutex::new(());

/// Allocate a working folder for one job.
///
/// With `use_subfolder` the first free `temp{N}` subfolder of `base_folder`
/// is created and returned; without it `base_folder` itself is created if
/// missing and returned, and sharing it between jobs is the caller's
/// responsibility. Allocated folders are never deleted here; operators prune
/// them once the artifacts inside are no longer needed.
pub fn allocate(base_folder: &Path, use_subfolder: bool) -> Result<PathBuf> {
    if use_subfolder {
        allocate_bounded(base_folder, MAX_INDEX)
    } else {
        fs::create_dir_all(base_folder)?;
        Ok(base_folder.to_path_buf())
    }
}

/// Allocate a `temp{N}` subfolder with an explicit scan bound.
///
/// Returns `Error::ResourceExhausted` once every index below `max_index`
/// exists, which bounds runaway folder creation.
pub fn allocate_bounded(base_folder: &Path, max_index: usize) -> Result<PathBuf> {
    let _guard = LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    for index in 0..max_index {
        let folder = base_folder.join(format!("temp{index}"));
        if folder.exists() {
            continue;
        }
        fs::create_dir_all(&folder)?;
        debug!("Allocated work folder {}", folder.display());
        return Ok(folder);
    }
    Err(Error::ResourceExhausted)
}
