//! Filesystem watching: source changes re-run their mapped task, compiled
//! HTML changes trigger a full browser reload.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (pure timing) → WatchRoots (path → subscription) → thread per task
//! ```
//!
//! Subscriptions are independent: concurrent edits to a stylesheet and a
//! template dispatch both tasks with no coordination, and an in-flight task
//! is never cancelled when a new change arrives.

mod classify;
mod debounce;

pub use classify::{Subscription, WatchRoots};

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};

use anyhow::Result;
use notify::{RecursiveMode, Watcher};

use crate::config::PipelineConfig;
use crate::core::{BuildMode, TaskOutcome};
use crate::logger;
use crate::pipeline::Task;
use crate::reload;
use debounce::Debouncer;

/// Spawn the watcher thread. Subscriptions live for the process lifetime;
/// there is no explicit teardown beyond process shutdown.
pub fn spawn_watcher(config: Arc<PipelineConfig>) -> Result<()> {
    let roots = WatchRoots::new(&config);

    // Create sync channel for notify (events buffer while tasks run)
    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;

    // Watch all existing roots; missing source directories are simply not
    // watched (the original registers globs that may match nothing).
    for root in roots.roots() {
        if root.exists() {
            watcher.watch(root, RecursiveMode::Recursive)?;
            crate::debug!("watch"; "watching {}", root.display());
        }
    }

    std::thread::spawn(move || {
        // Keep the watcher handle alive for the lifetime of the loop.
        let _watcher = watcher;
        run_loop(&rx, &roots, &config);
    });
    Ok(())
}

fn run_loop(
    rx: &Receiver<notify::Result<notify::Event>>,
    roots: &WatchRoots,
    config: &Arc<PipelineConfig>,
) {
    let mut debouncer = Debouncer::new();
    loop {
        if crate::core::is_shutdown() {
            break;
        }

        match rx.recv_timeout(debouncer.poll_interval()) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(e)) => crate::log!("watch"; "notify error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(paths) = debouncer.take_if_ready() {
            dispatch(&paths, roots, config);
        }
    }
}

/// Fire each triggered subscription on its own thread. No ordering
/// guarantee between subscriptions.
fn dispatch(paths: &[std::path::PathBuf], roots: &WatchRoots, config: &Arc<PipelineConfig>) {
    for subscription in roots.classify_batch(paths) {
        match subscription {
            Subscription::Run(task) => {
                let config = Arc::clone(config);
                std::thread::spawn(move || run_task(task, &config));
            }
            Subscription::FullReload => {
                crate::debug!("watch"; "compiled html changed, reloading browsers");
                reload::push_reload("page updated");
            }
        }
    }
}

/// Run one watch-triggered task; the watch session survives any failure.
fn run_task(task: Task, config: &PipelineConfig) {
    crate::debug!("watch"; "{} task triggered", task.name());
    match task.run(config, BuildMode::DEVELOPMENT) {
        Ok(TaskOutcome::Completed) => {
            logger::status_success(&format!("rebuilt: {}", task.name()));
        }
        Ok(TaskOutcome::Skipped { reason }) => {
            logger::status_warning(&format!("{}: {}", task.name(), reason));
        }
        Err(e) => {
            // Resilient tasks surfaced their own notification already.
            if !task.resilient() {
                logger::status_error(&format!("{} failed", task.name()), &format!("{e:#}"));
            }
        }
    }
}
