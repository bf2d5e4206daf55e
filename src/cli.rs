use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "fssize", version, disable_version_flag = true)]
#[command(about = "Find biggest regular files", long_about = None)]
#[command(group(ArgGroup::new("output").multiple(false)))]
pub struct Cli {
    /// Directory to scan
    #[arg(default_value = "/")]
    pub path: PathBuf,

    /// Ignore files and folders starting with '.'
    #[arg(short = 'i', long)]
    pub ignore_hidden_files: bool,

    /// Max amount of files/folders/packages to output [default: 150]
    #[arg(short = 'c', long, value_name = "N", allow_negative_numbers = true)]
    pub max_file_count: Option<i64>,

    /// Output to stdout, biggest filesize first, filenames with newlines omitted
    #[arg(short = 'o', long, group = "output")]
    pub output_files: bool,

    /// Output to stdout, biggest sum filesize first, paths with newlines omitted
    #[arg(long, group = "output")]
    pub output_dirs: bool,

    /// Output to stdout, biggest estimated filesize first
    #[arg(long, group = "output")]
    pub output_packages: bool,

    /// Output version information and exit
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    pub version: Option<bool>,
}

/// Which ranked list batch mode prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchTarget {
    Files,
    Dirs,
    Packages,
}

impl Cli {
    /// `None` means interactive mode.
    pub fn batch_target(&self) -> Option<BatchTarget> {
        if self.output_files {
            Some(BatchTarget::Files)
        } else if self.output_dirs {
            Some(BatchTarget::Dirs)
        } else if self.output_packages {
            Some(BatchTarget::Packages)
        } else {
            None
        }
    }
}
