//! Logging setup.
//!
//! Interactive sessions log to a file so output never draws over the terminal
//! UI; one-shot commands log to stderr.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

/// `RUST_LOG` wins; otherwise stderr stays quiet below warnings unless verbose.
fn filter(target: &LogTarget<'_>, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("versechat={}", default_level(target, verbose))))
}

fn default_level(target: &LogTarget<'_>, verbose: bool) -> &'static str {
    match (target, verbose) {
        (_, true) => "debug",
        (LogTarget::Stderr, false) => "warn",
        (LogTarget::File(_), false) => "info",
    }
}

/// Install the global tracing subscriber
pub fn init(target: LogTarget<'_>, verbose: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(&target, verbose));

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(dir) => {
            std::fs::create_dir_all(dir).context("Failed to create log directory")?;
            let appender = tracing_appender::rolling::never(dir, "versechat.log");
            builder.with_writer(appender).with_ansi(false).try_init()
        }
    };
    installed.map_err(|err| anyhow::anyhow!("Failed to initialize logging: {err}"))
}
