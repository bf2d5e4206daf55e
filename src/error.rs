use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Cannot stat {}: {source}", path.display())]
    RootStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Walk aborted at {}", .0.display())]
    WalkAborted(PathBuf),

    #[error("Package query unavailable: {0}")]
    PackageQueryUnavailable(String),

    #[error("Unexpected package query output on line {line}: {reason}")]
    PackageParse { line: usize, reason: String },
}
