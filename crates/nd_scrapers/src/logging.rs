use std::io;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

fn default_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // html5ever is noisy about malformed markup on news pages
    format!("{},html5ever=error,selectors=warn,hyper=warn,reqwest=warn", level)
}

/// Installs the global subscriber once. `RUST_LOG` takes precedence over
/// `verbosity`. Logs go to stderr so stdout can carry JSON.
pub fn init_logging(verbosity: u8) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(verbosity > 0)
            .try_init();
    });
}
