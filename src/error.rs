//! Error types for neutral-ipc-client.

use std::time::Duration;

use thiserror::Error;

/// Main error type for all IPC operations.
#[derive(Debug, Error)]
pub enum IpcError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (schemas and inner results).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Record header was not exactly `HEADER_SIZE` bytes.
    #[error("Invalid header length: expected {expected} bytes, got {actual}")]
    InvalidHeaderLength { expected: usize, actual: usize },

    /// Segment does not fit the 4-byte length field.
    #[error("Content too large: {0} bytes")]
    ContentTooLarge(usize),

    /// Connecting to the rendering service did not finish in time.
    #[error("Connection to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    /// An I/O phase after connect did not finish in time.
    #[error("Timed out while {0}")]
    Timeout(&'static str),

    /// Peer closed the connection before the full record arrived.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Schema cannot be used as a JSON object.
    #[error("Schema error: {0}")]
    Schema(String),
}

/// Result type alias using IpcError.
pub type Result<T> = std::result::Result<T, IpcError>;
