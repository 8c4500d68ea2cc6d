use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn logs_are_json() -> bool {
    matches!(std::env::var("TRENDY_LOG_FORMAT").as_deref(), Ok("json"))
}

/// Initialize tracing from `RUST_LOG` (default `info`); `TRENDY_LOG_FORMAT=json`
/// switches stderr output to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    if logs_are_json() {
        let _ = registry.with(fmt_layer.json().flatten_event(true)).try_init();
    } else {
        let _ = registry.with(fmt_layer.compact()).try_init();
    }
}
