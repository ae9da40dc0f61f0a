//! Schema payload sent in segment 1 of every render request.
//!
//! A schema is either JSON text (mergeable) or an opaque binary blob.
//! The format tag is fixed at construction and travels with the payload.

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec::MsgPackCodec;
use crate::error::{IpcError, Result};
use crate::protocol::format;

/// Wire representation of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaPayload {
    Text(String),
    Binary(Bytes),
    Absent,
}

impl SchemaPayload {
    /// Bytes placed in segment 1. `Absent` sends an empty segment.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => &bytes[..],
            Self::Absent => &[],
        }
    }
}

/// Schema plus the format tag it is sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    format: u8,
    payload: SchemaPayload,
}

impl Schema {
    /// JSON schema serialized from any serializable value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self {
            format: format::JSON,
            payload: SchemaPayload::Text(serde_json::to_string(value)?),
        })
    }

    /// JSON schema that is already serialized. Not validated until merged.
    pub fn json_str(text: impl Into<String>) -> Self {
        Self {
            format: format::JSON,
            payload: SchemaPayload::Text(text.into()),
        }
    }

    /// MessagePack schema serialized from any serializable value.
    pub fn msgpack<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self {
            format: format::MSGPACK,
            payload: SchemaPayload::Binary(Bytes::from(MsgPackCodec::encode(value)?)),
        })
    }

    /// MessagePack schema that is already serialized.
    pub fn msgpack_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            format: format::MSGPACK,
            payload: SchemaPayload::Binary(bytes.into()),
        }
    }

    /// No schema; an empty segment is sent with `format`.
    pub fn absent(format: u8) -> Self {
        Self {
            format,
            payload: SchemaPayload::Absent,
        }
    }

    #[inline]
    pub fn format(&self) -> u8 {
        self.format
    }

    #[inline]
    pub fn payload(&self) -> &SchemaPayload {
        &self.payload
    }

    /// Bytes placed in segment 1.
    #[inline]
    pub fn wire_bytes(&self) -> &[u8] {
        self.payload.as_bytes()
    }

    /// Only JSON-tagged text (or an absent JSON schema) can be merged.
    /// MessagePack and other binary formats are opaque.
    #[inline]
    pub fn is_mergeable(&self) -> bool {
        self.format == format::JSON && !matches!(self.payload, SchemaPayload::Binary(_))
    }

    /// Parse the current payload as a JSON object. `Absent` reads as `{}`.
    pub fn to_json_object(&self) -> Result<Map<String, Value>> {
        match &self.payload {
            SchemaPayload::Text(text) => into_object(serde_json::from_str(text)?, "current schema"),
            SchemaPayload::Absent => Ok(Map::new()),
            SchemaPayload::Binary(_) => Err(IpcError::Schema(
                "binary schema cannot be read as JSON".to_string(),
            )),
        }
    }

    /// Deep-merge `overlay` into this schema and re-serialize it.
    ///
    /// Returns `Ok(false)` without touching anything for non-JSON schemas.
    /// On error the schema is left unchanged.
    pub fn merge(&mut self, overlay: Value) -> Result<bool> {
        if !self.is_mergeable() {
            return Ok(false);
        }
        let mut merged = self.to_json_object()?;
        deep_merge(&mut merged, into_object(overlay, "new schema")?);
        self.payload = SchemaPayload::Text(serde_json::to_string(&merged)?);
        Ok(true)
    }
}

/// Merge `overlay` into `base`.
///
/// When both sides hold an object under the same key the objects are merged
/// recursively; in every other case the overlay value replaces the base value.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, incoming) in overlay {
        match incoming {
            Value::Object(incoming) => match base.get_mut(&key) {
                Some(Value::Object(existing)) => deep_merge(existing, incoming),
                _ => {
                    base.insert(key, Value::Object(incoming));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}

fn into_object(value: Value, what: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(IpcError::Schema(format!(
            "{} must be a JSON object, got {}",
            what,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
