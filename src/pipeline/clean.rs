//! Output directory cleanup.

use std::fs;

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::core::TaskOutcome;

/// Delete every entry under the output directory, keeping the root itself.
///
/// Used only by the production build sequence; development runs overwrite
/// in place.
pub fn clean_task(config: &PipelineConfig) -> Result<TaskOutcome> {
    let output = &config.paths.output;
    if !output.is_dir() {
        return Ok(TaskOutcome::Completed);
    }

    for entry in
        fs::read_dir(output).with_context(|| format!("failed to read {}", output.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        }
        .with_context(|| format!("failed to remove {}", path.display()))?;
    }

    crate::log!("clean"; "emptied {}", output.display());
    Ok(TaskOutcome::Completed)
}

// ============================================================================
// Tests
// ============================================================================
