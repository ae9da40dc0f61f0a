//! Protocol module - wire format and record types.
//!
//! This module implements the binary protocol spoken with the rendering service:
//! - 12-byte header encoding/decoding
//! - Record struct carrying two length-prefixed content segments

mod record;
mod wire_format;

pub use record::{encode_record, Record};
pub use wire_format::{control, decode_header, encode_header, format, Header, HEADER_SIZE, RESERVED};
