//! Decoded render result.
//!
//! Built fresh from each response record and never mutated afterwards; a new
//! render replaces it entirely.

use serde_json::{Map, Value};

use crate::protocol::{control, Record};

/// Segment 1 of a response, interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum InnerResult {
    /// Segment 1 parsed as a JSON object.
    Json(Map<String, Value>),
    /// Segment 1 did not parse as a JSON object; kept verbatim.
    Raw(String),
}

impl InnerResult {
    /// Parse segment text, falling back to the raw string.
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Self::Json(map),
            _ => Self::Raw(text),
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Json(map) => Some(map),
            Self::Raw(_) => None,
        }
    }

    /// Explicit `has_error: true` reported by the service.
    pub fn reports_error(&self) -> bool {
        self.as_object()
            .and_then(|map| map.get("has_error"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.as_object()?.get(key)?.as_str()
    }
}

/// Everything known about one completed render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    /// The response record as received.
    pub record: Record,
    /// Segment 1, parsed.
    pub inner: InnerResult,
    /// Response control byte.
    pub status: u8,
    /// Segment 2: the rendered output.
    pub content: String,
}

impl RenderResult {
    pub fn from_record(record: Record) -> Self {
        let inner = InnerResult::parse(record.content1_text());
        let content = record.content2_text();
        Self {
            status: record.control(),
            inner,
            content,
            record,
        }
    }

    /// True when the control byte is not OK or the service flagged an error.
    pub fn has_error(&self) -> bool {
        self.status != control::STATUS_OK || self.inner.reports_error()
    }

    /// Status code from the inner result.
    ///
    /// The service may send it as a number or as a numeric string.
    pub fn status_code(&self) -> Option<u16> {
        match self.inner.as_object()?.get("status_code")? {
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        self.inner.get_str("status_text")
    }

    pub fn status_param(&self) -> Option<&str> {
        self.inner.get_str("status_param")
    }
}
