use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use colored::*;
use tracing::{debug, info, trace};

use super::{ScanState, View, PSEUDO_FS_ROOTS};
use crate::error::Error;
use crate::model::SizedEntry;
use crate::progress::{ScanObserver, WalkControl};

const PROGRESS_EVERY_DIRS: u64 = 64;

#[derive(Debug, Clone, Default)]
pub struct WalkSummary {
    pub files: u64,
    pub directories: u64,
    pub bytes: u64,
    pub errors: u64,
    pub elapsed: Duration,
}

/// Walks `state.root()`, feeding regular files into the file list and each directory's
/// own file total into the folder list.
///
/// A directory's size is the sum of the regular files directly inside it; nested
/// directories are ranked on their own and not added to their parent. Symlinks are never
/// followed. Failing to stat the root is the only fatal condition, everything below the
/// root is skipped on error.
///
/// The hidden filter only applies below the root, so a hidden root such as `~/.cache`
/// is still scanned when named explicitly. The pseudo-filesystem refusal applies to the
/// root as well.
pub fn walk(state: &ScanState, observer: &dyn ScanObserver) -> Result<WalkSummary, Error> {
    state.set_accumulating(true);
    observer.on_walk_start(state.root());

    let walker = Walker {
        state,
        observer,
        summary: WalkSummary::default(),
    };
    let result = walker.run();

    state.set_accumulating(false);
    observer.on_walk_finish(result.as_ref().ok());
    result
}

pub fn is_pseudo_fs(path: &Path) -> bool {
    PSEUDO_FS_ROOTS.iter().any(|root| path == Path::new(root))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().starts_with(b".")
}

struct Walker<'a> {
    state: &'a ScanState,
    observer: &'a dyn ScanObserver,
    summary: WalkSummary,
}

impl Walker<'_> {
    fn run(mut self) -> Result<WalkSummary, Error> {
        let start = Instant::now();
        let root = self.state.root().to_path_buf();

        let metadata = fs::metadata(&root).map_err(|source| Error::RootStat {
            path: root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(Error::NotADirectory(root));
        }

        info!("Scanning {}", root.display());
        if is_pseudo_fs(&root) {
            info!("Refusing to size pseudo filesystem {}", root.display());
            return Ok(self.summary);
        }

        // Depth-first; children pushed in reverse so they pop in listing order.
        let mut pending = vec![root];
        while let Some(dir) = pending.pop() {
            let subdirs = self.visit_dir(&dir)?;
            pending.extend(subdirs.into_iter().rev());
        }

        self.summary.elapsed = start.elapsed();
        info!(
            "Walk completed in {} seconds: {} files, {} directories, {} bytes, {} errors",
            format!("{:.2}", self.summary.elapsed.as_secs_f64()).green(),
            self.summary.files,
            self.summary.directories,
            self.summary.bytes,
            self.summary.errors,
        );
        Ok(self.summary)
    }

    /// Lists `dir`, ranks its regular files and then the directory itself.
    /// Returns the subdirectories still to visit.
    fn visit_dir(&mut self, dir: &Path) -> Result<Vec<PathBuf>, Error> {
        let mut subdirs = Vec::new();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => Some(entries),
            Err(err) => {
                self.summary.errors += 1;
                debug!("Cannot list directory {}: {}", dir.display(), err);
                match self.observer.on_walk_error(dir, &err) {
                    WalkControl::Continue => None,
                    WalkControl::SkipDir => return Ok(subdirs),
                    WalkControl::Abort => return Err(Error::WalkAborted(dir.to_path_buf())),
                }
            }
        };

        let mut dir_size = 0u64;
        for entry in entries.into_iter().flatten() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.summary.errors += 1;
                    debug!("Error reading entry in {}: {}", dir.display(), err);
                    continue;
                }
            };

            if self.state.ignore_hidden() && is_hidden(&entry) {
                trace!("Skipping hidden {}", entry.path().display());
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    self.summary.errors += 1;
                    debug!("Cannot stat {}: {}", entry.path().display(), err);
                    continue;
                }
            };

            let path = entry.path();
            if file_type.is_dir() {
                if is_pseudo_fs(&path) {
                    debug!("Skipping pseudo filesystem {}", path.display());
                } else {
                    subdirs.push(path);
                }
                continue;
            }

            // Symlinks, sockets, fifos and devices are neither counted nor followed
            if !file_type.is_file() {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    self.summary.errors += 1;
                    debug!("Cannot stat {}: {}", path.display(), err);
                    continue;
                }
            };

            dir_size += size;
            self.summary.files += 1;
            self.summary.bytes += size;
            self.state.try_insert(View::Files, SizedEntry::new(path, size));
        }

        self.summary.directories += 1;
        self.state
            .try_insert(View::Folders, SizedEntry::new(dir.to_path_buf(), dir_size));

        if self.summary.directories % PROGRESS_EVERY_DIRS == 0 {
            self.observer.on_walk_progress(self.summary.files, dir);
        }

        Ok(subdirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pseudo_fs_roots_match_exact_paths_only() {
        assert!(is_pseudo_fs(Path::new("/proc")));
        assert!(is_pseudo_fs(Path::new("/home/.ecryptfs")));
        assert!(!is_pseudo_fs(Path::new("/proc/self")));
        assert!(!is_pseudo_fs(Path::new("/home/user/dev")));
    }
}
