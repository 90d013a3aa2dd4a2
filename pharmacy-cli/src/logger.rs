//! Logging Infrastructure
//!
//! Console logs go to stderr so command output on stdout stays clean.
//! With a log directory, events on the `security` target (rejected cart
//! actions, failed logins, account changes) are also kept in a daily
//! rotating JSON file.

use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// `RUST_LOG`, when set, overrides `level`.
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let json_console = json_format.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
    });
    let pretty_console = (!json_format).then(|| {
        fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_writer(std::io::stderr)
    });

    let security_file = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let security_log = RollingFileAppender::new(Rotation::DAILY, dir, "security");
            Some(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(security_log))
                    .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                        meta.target() == "security"
                    })),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(pretty_console)
        .with(security_file)
        .try_init()?;
    Ok(())
}
