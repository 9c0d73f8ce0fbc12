//! Named build tasks and composite sequences.
//!
//! A task transforms one source file set into one output file set; composite
//! sequences run tasks strictly one after another, each task's return gating
//! the next. Write targets are disjoint subdirectories of the output root,
//! so concurrent watch-triggered runs need no locking.

mod assets;
mod clean;
mod scripts;
mod styles;
mod templates;

pub use assets::{fonts_task, images_task};
pub use clean::clean_task;
pub use scripts::scripts_task;
pub use styles::styles_task;
pub use templates::templates_task;

use anyhow::Result;

use crate::config::PipelineConfig;
use crate::core::{BuildMode, TaskOutcome};

/// A named, invokable unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Templates,
    Styles,
    Scripts,
    Fonts,
    Images,
    Clean,
}

impl Task {
    /// Run this task to completion with the given mode policy.
    pub fn run(self, config: &PipelineConfig, mode: BuildMode) -> Result<TaskOutcome> {
        match self {
            Self::Templates => templates_task(config),
            Self::Styles => styles_task(config, mode),
            Self::Scripts => scripts_task(config, mode),
            Self::Fonts => fonts_task(config),
            Self::Images => images_task(config, mode),
            Self::Clean => clean_task(config),
        }
    }

    /// Task name used for log prefixes and CLI output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Templates => "html",
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Fonts => "fonts",
            Self::Images => "images",
            Self::Clean => "clean",
        }
    }

    /// Tasks whose compile errors are reported but do not halt a sequence.
    ///
    /// Template and stylesheet errors surface a notification and end that
    /// run only; copy/IO failures elsewhere fail the sequence fast.
    pub(crate) const fn resilient(self) -> bool {
        matches!(self, Self::Templates | Self::Styles)
    }
}

/// Production build sequence: clean, then regenerate everything.
pub const BUILD_SEQUENCE: &[Task] = &[
    Task::Clean,
    Task::Templates,
    Task::Styles,
    Task::Scripts,
    Task::Fonts,
    Task::Images,
];

/// Development sequence: regenerate in place, no clean.
pub const DEV_SEQUENCE: &[Task] = &[
    Task::Templates,
    Task::Styles,
    Task::Scripts,
    Task::Fonts,
    Task::Images,
];

/// Run tasks strictly one after another.
///
/// Compile errors from resilient tasks have already been surfaced by the
/// task itself; the sequence continues past them. Any other error stops
/// the sequence.
pub fn run_sequence(tasks: &[Task], config: &PipelineConfig, mode: BuildMode) -> Result<()> {
    for task in tasks {
        match task.run(config, mode) {
            Ok(TaskOutcome::Completed) => {}
            Ok(TaskOutcome::Skipped { reason }) => {
                crate::debug!(task.name(); "skipped: {}", reason);
            }
            Err(e) if task.resilient() => {
                crate::debug!(task.name(); "run aborted: {:#}", e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use std::fs;

    #[test]
    fn test_sequence_order() {
        assert_eq!(BUILD_SEQUENCE[0], Task::Clean);
        assert_eq!(&BUILD_SEQUENCE[1..], DEV_SEQUENCE);
        // Templates before styles before scripts
        assert_eq!(DEV_SEQUENCE[0], Task::Templates);
        assert_eq!(DEV_SEQUENCE[1], Task::Styles);
        assert_eq!(DEV_SEQUENCE[2], Task::Scripts);
    }

    #[test]
    fn test_invalid_script_does_not_halt_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        fs::create_dir_all(config.paths.styles_dir()).unwrap();
        fs::write(&config.paths.styles, "body { color: red; }").unwrap();
        fs::create_dir_all(config.paths.scripts_dir()).unwrap();
        fs::write(&config.paths.scripts, "function {{{ nope").unwrap();

        run_sequence(DEV_SEQUENCE, &config, BuildMode::DEVELOPMENT).unwrap();

        // The broken bundle wrote nothing, but the stylesheet after it ran.
        assert!(!config.paths.js_output().join("main.js").exists());
        assert!(config.paths.css_output().join("main.css").exists());
    }

    #[test]
    fn test_template_error_does_not_halt_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        fs::create_dir_all(&config.paths.templates).unwrap();
        fs::write(
            config.paths.templates.join("index.html"),
            "{% unclosed_tag",
        )
        .unwrap();
        fs::create_dir_all(config.paths.styles_dir()).unwrap();
        fs::write(&config.paths.styles, "body { color: red; }").unwrap();

        run_sequence(DEV_SEQUENCE, &config, BuildMode::DEVELOPMENT).unwrap();

        assert!(!config.paths.output.join("index.html").exists());
        assert!(config.paths.css_output().join("main.css").exists());
    }

    #[test]
    fn test_build_leaves_only_fresh_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        fs::create_dir_all(&config.paths.templates).unwrap();
        fs::write(config.paths.templates.join("index.html"), "<h1>Hello</h1>").unwrap();
        fs::create_dir_all(config.paths.styles_dir()).unwrap();
        fs::write(&config.paths.styles, "body { color: red; }").unwrap();
        fs::create_dir_all(config.paths.scripts_dir()).unwrap();
        fs::write(&config.paths.scripts, "console.log('hi');").unwrap();

        // Stale artifact from a previous run
        fs::create_dir_all(&config.paths.output).unwrap();
        fs::write(config.paths.output.join("stale.html"), "old").unwrap();

        run_sequence(BUILD_SEQUENCE, &config, BuildMode::PRODUCTION).unwrap();

        assert!(!config.paths.output.join("stale.html").exists());
        assert!(config.paths.output.join("index.html").exists());
        assert!(config.paths.css_output().join("main.css").exists());
        assert!(config.paths.js_output().join("main.js").exists());
    }
}
