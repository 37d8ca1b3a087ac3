//! `tracing` subscriber setup.
//!
//! One-shot commands log to stderr. The terminal UI owns the screen, so it
//! only logs when `log.file` is configured.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// `log.file` if set, otherwise nothing.
    File,
}

/// `RUST_LOG` when set, otherwise the configured level.
fn filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init(settings: &LogSettings, target: LogTarget) {
    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter(settings))
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
        }
        LogTarget::File => {
            let Some(path) = &settings.file else {
                return;
            };
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => {
                    let _ = tracing_subscriber::fmt()
                        .with_env_filter(filter(settings))
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .try_init();
                }
                Err(e) => {
                    // Logging is optional; failures should not prevent the app from starting.
                    eprintln!("pi-remote: cannot open log file {}: {e}", path.display());
                }
            }
        }
    }
}
