//! Atomic output commit.
//!
//! Backends only ever write to the temp path. A successful dump is published
//! by renaming the temp file onto the final path, so the final path is never
//! observed partially written. Rename is only atomic when both paths live on
//! the same filesystem; the temp path always sits next to the final path.

use crate::core::config::{FailedTempPolicy, ProcessingSettings};
use crate::core::paths::PathPair;
use crate::{ExtractError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Remove a temp file left behind by an earlier run.
///
/// A missing file is success.
pub fn remove_stale_temp(temp_path: &Path) -> Result<()> {
    match fs::remove_file(temp_path) {
        Ok(()) => {
            debug!("Removed stale {}", temp_path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Publish the temp file at the final path.
///
/// # Errors
///
/// Returns `ExtractError::Commit` when the rename fails. The temp file is
/// left in place in that case.
pub fn commit(pair: &PathPair) -> Result<()> {
    fs::rename(&pair.temp_path, &pair.final_path).map_err(|source| ExtractError::Commit {
        from: pair.temp_path.clone(),
        to: pair.final_path.clone(),
        source,
    })
}

/// Apply the failed-temp policy after a backend failure.
///
/// Never touches the final path. Removal problems are only logged, so the
/// backend error stays the one reported for the file.
pub fn discard_failed_temp(pair: &PathPair, settings: &ProcessingSettings) {
    match settings.failed_temp {
        FailedTempPolicy::Keep => {
            if pair.temp_path.exists() {
                debug!("Leaving {} for inspection", pair.temp_path.display());
            }
        }
        FailedTempPolicy::Remove => {
            if let Err(e) = remove_stale_temp(&pair.temp_path) {
                warn!("Could not remove {}: {}", pair.temp_path.display(), e);
            }
        }
    }
}
