use std::io;
use std::path::Path;

use crate::scan::walk::WalkSummary;

/// What the walker does with a directory it failed to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    /// Record the directory with an empty listing and carry on.
    Continue,
    /// Leave the directory out entirely.
    SkipDir,
    /// Stop the whole walk.
    Abort,
}

/// Trait for observing a scan.
///
/// The interactive display implements it with event-queue messages, batch mode with an
/// indicatif spinner. All methods have default implementations.
pub trait ScanObserver: Send + Sync {
    fn on_walk_start(&self, _root: &Path) {}
    fn on_walk_progress(&self, _files_seen: u64, _current_dir: &Path) {}

    /// Called when a directory cannot be listed.
    fn on_walk_error(&self, _path: &Path, _err: &io::Error) -> WalkControl {
        WalkControl::SkipDir
    }

    /// Called exactly once per walk, after the accumulating flag went false.
    fn on_walk_finish(&self, _summary: Option<&WalkSummary>) {}

    fn on_packages_finish(&self, _count: Option<usize>) {}
}

/// No-op observer for silent operation.
pub struct SilentObserver;

impl ScanObserver for SilentObserver {}
