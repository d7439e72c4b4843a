//! Logging setup utilities for Convoy binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for the given crate targets.
///
/// Crate names are normalized to their module form (`convoy-server` becomes
/// `convoy_server`) so they match tracing targets.
pub fn default_filter(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level applies to every crate listed in `targets`, plus `tower_http`
/// so request traces show up next to session logs. The filter can be
/// overridden with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `targets` - Crate names to enable (e.g., `["convoy-server", "convoy-shared"]`)
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use convoy_shared::logger::setup_logger;
///
/// setup_logger(&[env!("CARGO_PKG_NAME")], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    let mut all_targets = targets.to_vec();
    all_targets.push("tower_http");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(&all_targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
