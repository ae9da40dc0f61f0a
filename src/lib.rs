//! # neutral-ipc-client
//!
//! Rust client for the Neutral IPC template rendering protocol.
//!
//! A rendering service listens on TCP. Each render is one connection carrying
//! one request record (schema + template reference) and one response record
//! (inner result + rendered content).
//!
//! ## Layers
//!
//! - **Protocol**: 12-byte big-endian header followed by two length-driven segments
//! - **Transport**: one-shot TCP exchange with connect and I/O deadlines
//! - **Session**: template + schema façade with deep schema merging
//! - **Status**: maps the service's status code to content, redirect or error page
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use neutral_ipc_client::{IpcConfig, RenderSession};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(IpcConfig::resolve());
//!     let mut session = RenderSession::from_src_value(
//!         config,
//!         "{:;hello:}",
//!         json!({"data": {"hello": "Hello World"}}),
//!     )?;
//!
//!     let contents = session.render().await;
//!     println!("{}", contents);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod status;
pub mod transport;

pub use config::IpcConfig;
pub use error::{IpcError, Result};
pub use session::{RenderSession, Schema, TemplateRef};
pub use status::{respond, RenderResponse, StatusAction};
pub use transport::IpcClient;
