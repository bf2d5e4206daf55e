pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;
pub mod progress;
pub mod scan;
pub mod tui;
pub mod utils;

pub use config::{AppConfig, Settings};
pub use error::Error;
pub use model::{RankedList, SizedEntry};
pub use progress::{ScanObserver, SilentObserver, WalkControl};
pub use scan::{Coordinator, PackageStatus, ScanState, View};
