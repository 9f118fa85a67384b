//! Tracing setup shared by the binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` wins when set; otherwise `LOG_LEVEL` (default `info`).
/// `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let level = std::env::var("LOG_LEVEL")
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if let Err(e) = res {
        eprintln!("tracing already initialised: {e}");
    }
}
