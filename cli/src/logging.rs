//! # Structured Logging
//!
//! Sets up the `tracing` subscriber for the operator binary. Output goes to
//! stderr only: stdout carries the command results (addresses, events,
//! state dumps) and must stay parseable.

use std::io;

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset. Ledger writes are logged at
/// `debug`, so they stay quiet unless asked for.
pub const DEFAULT_FILTER: &str = "deposit_gate=info,deposit_gate_contracts=info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable output for an interactive terminal.
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Installs the global subscriber. Call once, before any command runs.
///
/// `RUST_LOG` overrides `default_filter` when set, e.g.
///
/// ```text
/// RUST_LOG=deposit_gate_contracts=debug deposit-gate exec ...
/// ```
pub fn init_logging(default_filter: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(true)
                        .with_file(false),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(io::stderr).with_target(true))
                .init();
        }
    }

    tracing::debug!(?format, "logging initialized");
}
