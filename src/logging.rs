//! Logging helpers built on `log` + `env_logger`.
//!
//! The core never prints; stages emit `debug!`/`warn!` events and the host
//! application decides where they go. `init_logger` wires up `env_logger`
//! for binaries and test harnesses that want console output.

use log::{debug, error, info, log_enabled, warn, Level};

/// Initializes the logger with the `env_logger` crate.
pub fn init_logger() {
    env_logger::init();
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}

/// Logs a frame-sized bit buffer as hex at debug level, truncated so a bad
/// frame does not flood the log.
pub fn log_frame_hex(label: &str, bytes: &[u8]) {
    if log_enabled!(Level::Debug) {
        const PREVIEW: usize = 32;
        if bytes.len() <= PREVIEW {
            debug!("{label}: {}", hex::encode(bytes));
        } else {
            debug!(
                "{label}: {}.. ({} bytes)",
                hex::encode(&bytes[..PREVIEW]),
                bytes.len()
            );
        }
    }
}
