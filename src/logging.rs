use std::env;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "warn";

/// Sets up tracing. The filter comes from `FSSIZE_LOG`; `FSSIZE_LOG_FILE` adds a file
/// layer. Stderr only gets log lines in batch mode, the interactive screen owns the
/// terminal otherwise.
///
/// Keep the returned guard alive for the file writer to flush.
pub fn init_logger(batch: bool) -> Option<WorkerGuard> {
    let filter = env::var("FSSIZE_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let filter_layer = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match env::var("FSSIZE_LOG_FILE") {
        Ok(log_file_path) => {
            let file_appender = tracing_appender::rolling::never("./", log_file_path);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking) // Log to file
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    let stderr_layer = batch.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(false)
            .without_time()
            .compact()
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(filter_layer)
        .init();

    debug!("Tracing configured (batch: {})", batch);

    guard
}
