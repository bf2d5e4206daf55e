use std::fs;
use std::io::{self, ErrorKind};
use std::path::{self, Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use tracing::{debug, error, warn};

use fssize::batch::{self, SpinnerObserver};
use fssize::cli::Cli;
use fssize::config::{self, AppConfig, Settings};
use fssize::utils::clean_path;
use fssize::{logging, tui, ScanState};

fn main() -> ExitCode {
    dotenv().ok();

    let cli = Cli::parse();
    let _guard = logging::init_logger(cli.batch_target().is_some());

    let config = config::load_configuration().unwrap_or_else(|err| {
        warn!("Error loading configuration, using defaults: {}", err);
        AppConfig::default()
    });
    let settings = Settings::resolve(&cli, &config);
    debug!("settings: {:?}", settings);

    let Some(max_count) = settings.max_count() else {
        return ExitCode::SUCCESS;
    };

    let root = match validate_root(&cli.path) {
        Ok(root) => root,
        Err(message) => {
            let _ = batch::print_error(&mut io::stderr(), &message);
            return ExitCode::from(1);
        }
    };

    let state = ScanState::new(root, max_count, settings.ignore_hidden_files)
        .with_package_program(&settings.package_query_program);

    match cli.batch_target() {
        Some(target) => {
            let observer = SpinnerObserver::new();
            let result = batch::run(
                &state,
                target,
                &observer,
                &mut io::stdout().lock(),
                &mut io::stderr(),
            );
            match result {
                Err(err) if err.kind() != ErrorKind::BrokenPipe => {
                    error!("Error writing output: {}", err);
                    ExitCode::FAILURE
                }
                _ => ExitCode::SUCCESS,
            }
        }
        None => match tui::run(state, &settings) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                let _ = batch::print_error(&mut io::stderr(), &format!("{:#}", err));
                ExitCode::FAILURE
            }
        },
    }
}

/// Makes `path` absolute and clean without resolving symlinks and checks it is a directory.
fn validate_root(path: &Path) -> Result<PathBuf, String> {
    let root = clean_path(&path::absolute(path).unwrap_or_else(|_| path.to_path_buf()));
    match fs::metadata(&root) {
        Err(_) => Err(format!("No such directory: {}", root.display())),
        Ok(metadata) if !metadata.is_dir() => Err(format!("Not a directory: {}", root.display())),
        Ok(_) => Ok(root),
    }
}
