//! Tracing subscriber setup.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when RUST_LOG is not set
pub fn default_directives(debug: bool, http_debug: bool) -> &'static str {
    if http_debug {
        "v53a=debug,v53a_core=debug,reqwest=debug,hyper=debug,hyper_util=debug"
    } else if debug {
        "v53a=debug,v53a_core=debug"
    } else {
        "warn"
    }
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr, and also to `log_file` when given. The returned
/// guard must be kept alive until exit so buffered file logs are flushed.
pub fn init(debug: bool, http_debug: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug, http_debug)));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path {}", path.display()))?;
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(false, false), "warn");
        assert!(default_directives(true, false).contains("v53a_core=debug"));
        assert!(default_directives(false, true).contains("reqwest=debug"));
        assert!(default_directives(true, true).contains("hyper=debug"));
    }
}
