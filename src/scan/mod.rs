//! Scan state shared between the background scans and the display.
//!
//! `ScanState` owns the three ranked lists. Background tasks insert through it, the
//! display takes snapshots through it; both go through the same per-list mutex so a
//! reader never sees a list between an eviction and the re-insert.

pub mod coordinator;
pub mod packages;
pub mod walk;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::Error;
use crate::model::{RankedList, SizedEntry};
use crate::progress::ScanObserver;
use crate::utils::clean_path;

pub use coordinator::Coordinator;
pub use walk::WalkSummary;

/// Directories never descended into, whatever the hidden-file setting says.
pub const PSEUDO_FS_ROOTS: [&str; 4] = ["/dev", "/proc", "/sys", "/home/.ecryptfs"];

/// The three ranked views, cycled with Tab / Shift-Tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Files,
    Folders,
    Packages,
}

impl View {
    pub const ALL: [View; 3] = [View::Files, View::Folders, View::Packages];

    pub fn next(self) -> View {
        match self {
            View::Files => View::Folders,
            View::Folders => View::Packages,
            View::Packages => View::Files,
        }
    }

    pub fn prev(self) -> View {
        match self {
            View::Files => View::Packages,
            View::Folders => View::Files,
            View::Packages => View::Folders,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Files => "Files",
            View::Folders => "Folders",
            View::Packages => "Packages (dpkg-query)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PackageStatus {
    #[default]
    Pending,
    Ready,
    Unavailable(String),
}

pub struct ScanState {
    root: PathBuf,
    max_count: usize,
    ignore_hidden: bool,
    package_program: OsString,
    files: Mutex<RankedList>,
    folders: Mutex<RankedList>,
    packages: Mutex<RankedList>,
    accumulating: AtomicBool,
    package_status: Mutex<PackageStatus>,
}

impl ScanState {
    /// `root` is cleaned lexically, so every identifier built from it is free of `.` and
    /// `..` components.
    pub fn new(root: impl Into<PathBuf>, max_count: usize, ignore_hidden: bool) -> Self {
        Self {
            root: clean_path(&root.into()),
            max_count,
            ignore_hidden,
            package_program: OsString::from(packages::DEFAULT_PROGRAM),
            files: Mutex::new(RankedList::new(max_count)),
            folders: Mutex::new(RankedList::new(max_count)),
            packages: Mutex::new(RankedList::new(max_count)),
            accumulating: AtomicBool::new(false),
            package_status: Mutex::new(PackageStatus::Pending),
        }
    }

    pub fn with_package_program(mut self, program: impl Into<OsString>) -> Self {
        self.package_program = program.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn ignore_hidden(&self) -> bool {
        self.ignore_hidden
    }

    pub fn package_program(&self) -> &OsString {
        &self.package_program
    }

    /// Walk the root, filling the file and folder lists.
    pub fn scan_files_and_folders(&self, observer: &dyn ScanObserver) -> Result<WalkSummary, Error> {
        walk::walk(self, observer)
    }

    /// Query the package database, filling the package list.
    pub fn scan_packages(&self, observer: &dyn ScanObserver) -> Result<usize, Error> {
        let result = packages::list_packages(self);
        observer.on_packages_finish(result.as_ref().ok().copied());
        result
    }

    pub fn try_insert(&self, view: View, entry: SizedEntry) -> bool {
        lock(self.list(view)).try_insert(entry)
    }

    /// Copy of the current contents of one list, biggest first.
    pub fn snapshot(&self, view: View) -> Vec<SizedEntry> {
        lock(self.list(view)).entries().to_vec()
    }

    pub fn is_accumulating(&self) -> bool {
        self.accumulating.load(Ordering::Acquire)
    }

    pub(crate) fn set_accumulating(&self, value: bool) {
        self.accumulating.store(value, Ordering::Release);
    }

    pub fn package_status(&self) -> PackageStatus {
        lock(&self.package_status).clone()
    }

    pub(crate) fn set_package_status(&self, status: PackageStatus) {
        *lock(&self.package_status) = status;
    }

    fn list(&self, view: View) -> &Mutex<RankedList> {
        match view {
            View::Files => &self.files,
            View::Folders => &self.folders,
            View::Packages => &self.packages,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
