//! MsgPack codec using `rmp-serde`.
//!
//! Binary schemas (format tag `MSGPACK`) must arrive at the rendering service
//! as maps, so structs are always written with `to_vec_named`, never `to_vec`.
//!
//! # Example
//!
//! ```
//! use neutral_ipc_client::codec::MsgPackCodec;
//! use serde_json::{json, Value};
//!
//! let schema = json!({"data": {"hello": "Hello World"}});
//! let encoded = MsgPackCodec::encode(&schema).unwrap();
//! let decoded: Value = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, schema);
//! ```

use crate::error::Result;

/// MessagePack codec for binary schemas.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes in struct-as-map format.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
