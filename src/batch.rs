//! Non-interactive output: one identifier per line, biggest first.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use colored::*;
use console::style;
use indicatif::{HumanCount, ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use crate::cli::BatchTarget;
use crate::model::SizedEntry;
use crate::progress::{ScanObserver, WalkControl};
use crate::scan::{ScanState, View, WalkSummary};

pub const PACKAGES_SCRIPTING_WARNING: &str = "You should not use --output-packages in scripts
Use dpkg-query directly, something like this:

dpkg-query -Wf '${Installed-Size}\\t${Package}\\n' | sort -rn

This outputs the estimated kibibyte (KiB) size of all packages";

pub fn print_error(err: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(err, "{}", format!("fssize: {}", message).red())
}

/// Runs the scan `target` needs, synchronously, and prints its list to `out`.
pub fn run(
    state: &ScanState,
    target: BatchTarget,
    observer: &dyn ScanObserver,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<()> {
    let view = match target {
        BatchTarget::Files => View::Files,
        BatchTarget::Dirs => View::Folders,
        BatchTarget::Packages => View::Packages,
    };

    if view == View::Packages {
        if let Err(e) = state.scan_packages(observer) {
            warn!("{}", e);
        }
    } else if let Err(e) = state.scan_files_and_folders(observer) {
        warn!("{}", e);
    }

    write_entries(&state.snapshot(view), out, err)?;

    if view == View::Packages {
        print_error(err, PACKAGES_SCRIPTING_WARNING)?;
    }
    out.flush()
}

/// Writes identifiers as raw bytes, one per line. Identifiers containing a newline
/// cannot be delimited and are reported on `err` instead.
pub fn write_entries(entries: &[SizedEntry], out: &mut dyn Write, err: &mut dyn Write) -> io::Result<()> {
    for entry in entries {
        let bytes = entry.identifier.as_encoded_bytes();
        if bytes.contains(&b'\n') {
            print_error(
                err,
                &format!(
                    "Path omitted for containing a newline: {:?}",
                    entry.identifier.to_string_lossy()
                ),
            )?;
            continue;
        }
        out.write_all(bytes)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Spinner on stderr while batch mode walks. Hidden when stderr is not a terminal.
pub struct SpinnerObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerObserver {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for SpinnerObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanObserver for SpinnerObserver {
    fn on_walk_start(&self, root: &Path) {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(spinner_style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        pb.set_message(format!("Scanning {}...", root.display()));
        pb.enable_steady_tick(Duration::from_millis(80));
        *self.bar.lock().unwrap_or_else(|e| e.into_inner()) = Some(pb);
    }

    fn on_walk_progress(&self, files_seen: u64, current_dir: &Path) {
        let guard = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!(
                "Scanned {} files ({})",
                style(HumanCount(files_seen)).bold().green(),
                current_dir.display()
            ));
        }
    }

    fn on_walk_error(&self, path: &Path, err: &io::Error) -> WalkControl {
        debug!("Skipping unreadable directory {}: {}", path.display(), err);
        WalkControl::SkipDir
    }

    fn on_walk_finish(&self, _summary: Option<&WalkSummary>) {
        self.finish_bar();
    }
}
