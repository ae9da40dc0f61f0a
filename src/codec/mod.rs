//! Codec module - serialization for schema payloads.
//!
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` for the binary-serialized-map format
//!
//! JSON schemas go through `serde_json` directly.
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects,
//! so the schema format is chosen at the call site.

mod msgpack;

pub use msgpack::MsgPackCodec;
