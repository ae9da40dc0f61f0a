//! Connection settings for the rendering service.
//!
//! Settings come from an optional JSON file. Every field falls back to its own
//! default independently, and an unreadable or malformed file means "all
//! defaults". Resolving configuration never fails.
//!
//! ```json
//! { "host": "127.0.0.1", "port": 4273, "timeout": 10, "buffer_size": 8192 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

/// Well-known location of the settings file.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/neutral-ipc-cfg.json";

/// Default service host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default service port.
pub const DEFAULT_PORT: u16 = 4273;

/// Default timeout (connect and each I/O phase).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read chunk size in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Resolved connection settings.
///
/// Built once at startup and shared (usually behind an `Arc`) by every
/// client and session; nothing re-reads the file mid-call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub buffer_size: usize,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl IpcConfig {
    /// Resolve settings from [`DEFAULT_CONFIG_FILE`].
    pub fn resolve() -> Self {
        Self::from_file(DEFAULT_CONFIG_FILE)
    }

    /// Resolve settings from a JSON file, falling back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!("IPC config {} not readable ({}), using defaults", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                debug!("IPC config {} is not valid JSON ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Resolve settings from an already-parsed JSON value.
    ///
    /// A value that is not an object yields all defaults.
    pub fn from_value(value: &Value) -> Self {
        Self {
            host: host_or_default(value.get("host")),
            port: port_or_default(value.get("port")),
            timeout: timeout_or_default(value.get("timeout")),
            buffer_size: buffer_size_or_default(value.get("buffer_size")),
        }
    }

    /// `host:port` form used for connecting and in log messages.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Host must be a non-empty string.
fn host_or_default(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str) {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => {
            fallback("host", value);
            DEFAULT_HOST.to_string()
        }
    }
}

/// Port must be an integer in 1..=65535.
fn port_or_default(value: Option<&Value>) -> u16 {
    match value.and_then(Value::as_u64).map(u16::try_from) {
        Some(Ok(port)) if port != 0 => port,
        _ => {
            fallback("port", value);
            DEFAULT_PORT
        }
    }
}

/// Timeout must be a positive number of seconds that fits a `Duration`.
fn timeout_or_default(value: Option<&Value>) -> Duration {
    let timeout = value
        .and_then(Value::as_f64)
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
    match timeout {
        Some(timeout) => timeout,
        None => {
            fallback("timeout", value);
            DEFAULT_TIMEOUT
        }
    }
}

/// Buffer size must be a positive integer.
fn buffer_size_or_default(value: Option<&Value>) -> usize {
    match value.and_then(Value::as_u64).map(usize::try_from) {
        Some(Ok(size)) if size != 0 => size,
        _ => {
            fallback("buffer_size", value);
            DEFAULT_BUFFER_SIZE
        }
    }
}

fn fallback(key: &str, value: Option<&Value>) {
    if let Some(value) = value {
        debug!("IPC config key {:?} has unusable value {}, using default", key, value);
    }
}
