pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Default `EnvFilter` directive when neither `RUST_LOG` nor the config supplies one.
pub const DEFAULT_LOG_FILTER: &str = "finance_core=info";

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `directives`; an unparsable value falls back
/// to [`DEFAULT_LOG_FILTER`]. Output goes to stderr so command output stays clean.
pub fn init_tracing(directives: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(directives.unwrap_or(DEFAULT_LOG_FILTER)))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        // A host application may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
