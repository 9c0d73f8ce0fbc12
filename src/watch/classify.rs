//! Map changed paths to the subscription that handles them.

use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::pipeline::Task;
use crate::utils::path::absolutize;

/// A standing watch registration's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    /// Re-run the task that regenerates the changed source's output.
    Run(Task),
    /// Compiled HTML in the output root changed: full browser reload.
    FullReload,
}

/// Absolutized watch roots for path classification.
///
/// Event paths from the watcher are absolute; config paths may be relative,
/// so every root is absolutized once here.
pub struct WatchRoots {
    templates: PathBuf,
    styles: PathBuf,
    scripts: PathBuf,
    fonts: PathBuf,
    images: PathBuf,
    output: PathBuf,
}

impl WatchRoots {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            templates: absolutize(&config.paths.templates),
            styles: absolutize(&config.paths.styles_dir()),
            scripts: absolutize(&config.paths.scripts_dir()),
            fonts: absolutize(&config.paths.fonts),
            images: absolutize(&config.paths.images),
            output: absolutize(&config.paths.output),
        }
    }

    /// All roots to register with the watcher.
    pub fn roots(&self) -> [&Path; 6] {
        [
            &self.templates,
            &self.styles,
            &self.scripts,
            &self.fonts,
            &self.images,
            &self.output,
        ]
    }

    /// Classify one changed path.
    pub fn classify(&self, path: &Path) -> Option<Subscription> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        if path.starts_with(&self.templates) {
            return (ext.as_deref() == Some("html")).then_some(Subscription::Run(Task::Templates));
        }
        if path.starts_with(&self.styles) {
            return (ext.as_deref() == Some("css")).then_some(Subscription::Run(Task::Styles));
        }
        if path.starts_with(&self.scripts) {
            return (ext.as_deref() == Some("js")).then_some(Subscription::Run(Task::Scripts));
        }
        if path.starts_with(&self.fonts) {
            return Some(Subscription::Run(Task::Fonts));
        }
        if path.starts_with(&self.images) {
            return Some(Subscription::Run(Task::Images));
        }
        // Only compiled pages at the output root trigger a reload; asset
        // writes under output/assets are pushed by their own tasks.
        if ext.as_deref() == Some("html") && path.parent() == Some(self.output.as_path()) {
            return Some(Subscription::FullReload);
        }
        None
    }

    /// Classify a batch of changed paths, each subscription at most once,
    /// first-triggered order preserved.
    pub fn classify_batch(&self, paths: &[PathBuf]) -> Vec<Subscription> {
        let mut subscriptions = Vec::new();
        for path in paths {
            if let Some(subscription) = self.classify(path)
                && !subscriptions.contains(&subscription)
            {
                subscriptions.push(subscription);
            }
        }
        subscriptions
    }
}

// ============================================================================
// Tests
// ============================================================================
