//! Event debouncing: collect changes over a quiet window, dedup by path.
//!
//! Pure timing and deduplication; classification happens downstream.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Quiet window before a batch is released.
const DEBOUNCE_MS: u64 = 300;

/// Poll interval when no events are pending.
const IDLE_POLL_MS: u64 = 1000;

pub(super) struct Debouncer {
    /// Changed paths (dedup is free via set membership)
    changes: HashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: HashSet::new(),
            last_event: None,
        }
    }

    /// Add a notify event, ignoring metadata-only changes (mtime/chmod
    /// noise triggers endless rebuild loops) and editor temp files.
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            EventKind::Modify(modify) => {
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
            }
            _ => return,
        }

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            crate::debug!("watch"; "event: {}", path.display());
            self.changes.insert(path.clone());
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the collected batch once the quiet window has elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        let last_event = self.last_event?;
        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return None;
        }

        self.last_event = None;
        let changes: Vec<_> = self.changes.drain().collect();
        (!changes.is_empty()).then_some(changes)
    }

    /// How long the event loop may block waiting for the next event.
    pub(super) fn poll_interval(&self) -> Duration {
        if self.last_event.is_some() {
            Duration::from_millis(DEBOUNCE_MS / 2)
        } else {
            Duration::from_millis(IDLE_POLL_MS)
        }
    }
}

/// Editor scratch files that must not trigger rebuilds.
fn is_temp_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return true;
    };
    name.starts_with('.')
        || name.ends_with('~')
        || name.ends_with(".tmp")
        || name.ends_with(".swp")
        || name == "4913" // vim write test file
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use notify::event::{CreateKind, MetadataKind, ModifyKind};

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_dedup_and_release_after_window() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(EventKind::Create(CreateKind::File), "/src/a.css"));
        debouncer.add_event(&event(EventKind::Create(CreateKind::File), "/src/a.css"));

        // Window not elapsed yet
        assert!(debouncer.take_if_ready().is_none());

        // Force the window closed
        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 1));
        let batch = debouncer.take_if_ready().unwrap();
        assert_eq!(batch, vec![PathBuf::from("/src/a.css")]);

        // Batch was drained
        assert!(debouncer.take_if_ready().is_none());
    }

    #[test]
    fn test_metadata_changes_are_ignored() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)),
            "/src/a.css",
        ));
        assert!(debouncer.last_event.is_none());
    }

    #[test]
    fn test_temp_files_are_ignored() {
        assert!(is_temp_file(Path::new("/src/.main.css.swo")));
        assert!(is_temp_file(Path::new("/src/main.css~")));
        assert!(is_temp_file(Path::new("/src/main.css.swp")));
        assert!(is_temp_file(Path::new("/src/4913")));
        assert!(!is_temp_file(Path::new("/src/main.css")));
    }
}
