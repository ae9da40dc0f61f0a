//! Transport module - TCP exchange with the rendering service.
//!
//! One call, one connection: connect, write the request record, read the
//! response header, then read both segments with length-bounded chunked reads.

mod tcp;

pub use tcp::{exchange_on, read_content, IpcClient};
