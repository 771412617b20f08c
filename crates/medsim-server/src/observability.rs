//! Tracing setup. The fmt subscriber starts at the default level and is
//! re-filtered once `[logging]` has been read from configuration.
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

use crate::config::LoggingConfig;

/// Crates whose events follow `logging.level`.
const WORKSPACE_TARGETS: [&str; 5] = [
    "medsim_core",
    "medsim_db_memory",
    "medsim_api",
    "medsim_server",
    "tower_http",
];

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Filter directives for a configured level. Dependencies outside the
/// workspace stay at `warn` unless the level is quieter than that.
pub fn filter_directives(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    let floor = match level.as_str() {
        "error" | "off" => level.as_str(),
        _ => "warn",
    };
    let mut directives = vec![floor.to_string()];
    directives.extend(WORKSPACE_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

fn filter_for(logging: &LoggingConfig) -> Result<EnvFilter, String> {
    EnvFilter::try_new(filter_directives(&logging.level))
        .map_err(|e| format!("invalid logging.level {:?}: {e}", logging.level))
}

/// Install the global subscriber. `RUST_LOG` takes precedence when set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| filter_for(&LoggingConfig::default()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (reload_layer, handle) = reload::Layer::new(filter);
    let _ = FILTER_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Swap in the configured filter. A no-op when `RUST_LOG` is set or no
/// subscriber was installed through [`init_tracing`].
pub fn apply_logging_config(logging: &LoggingConfig) -> Result<(), String> {
    if std::env::var_os("RUST_LOG").is_some() {
        return Ok(());
    }
    let filter = filter_for(logging)?;
    match FILTER_HANDLE.get() {
        Some(handle) => handle
            .reload(filter)
            .map_err(|e| format!("failed to reload log filter: {e}")),
        None => Ok(()),
    }
}
