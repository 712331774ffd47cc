/*!
Logging and profiling setup.

Log output goes to stderr through `tracing-subscriber`. `RUST_LOG` is honored; when it is not
set, debug builds log at `debug` (keeping the per-pass thinning diagnostics at `info`) and
release builds at `info`.

With the `profiling` feature a `tracing-chrome` layer records every span to a
`trace-*.json` file in the working directory, viewable in Perfetto or `chrome://tracing`.
The file is flushed when the returned [`LoggingGuard`] is dropped.
*/

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Keeps profiling output alive until dropped
#[must_use = "dropping the guard flushes and closes the trace file"]
pub struct LoggingGuard {
    #[cfg(feature = "profiling")]
    _flush_guard: tracing_chrome::FlushGuard,
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn setup_logging() -> LoggingGuard {
    let default_filter = if cfg!(debug_assertions) {
        "debug,boundary_thinning=info"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    #[cfg(feature = "profiling")]
    {
        let (chrome_layer, flush_guard) = tracing_chrome::ChromeLayerBuilder::new().build();
        let _ = tracing_subscriber::registry()
            .with(fmt_layer)
            .with(chrome_layer)
            .try_init();
        tracing::info!("Profiling enabled, writing chrome trace to the working directory");
        LoggingGuard {
            _flush_guard: flush_guard,
        }
    }

    #[cfg(not(feature = "profiling"))]
    {
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
        LoggingGuard {}
    }
}

/// Log the package name and version
pub fn log_version_info() {
    tracing::info!(
        "{} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}
