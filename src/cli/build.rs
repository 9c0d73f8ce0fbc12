//! Build and single-task command entry points.

use anyhow::Result;

use crate::config::PipelineConfig;
use crate::core::{BuildMode, TaskOutcome};
use crate::pipeline::{self, Task};

/// Run the production build sequence: clean, then regenerate everything.
pub fn build_all(config: &PipelineConfig) -> Result<()> {
    pipeline::run_sequence(pipeline::BUILD_SEQUENCE, config, BuildMode::PRODUCTION)
}

/// Run a single task in development mode (the per-task subcommands).
///
/// Unlike a sequence, a failing task here reports through the exit code.
pub fn run_single(task: Task, config: &PipelineConfig) -> Result<()> {
    match task.run(config, BuildMode::DEVELOPMENT)? {
        TaskOutcome::Completed => Ok(()),
        TaskOutcome::Skipped { reason } => {
            crate::log!(task.name(); "nothing written: {}", reason);
            Ok(())
        }
    }
}
