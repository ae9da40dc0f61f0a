//! Record struct: a header plus its two content segments.
//!
//! Uses `bytes::Bytes` so segments read from the socket are shared, not copied.
//! Framing is entirely length-driven; there is no terminator.
//!
//! # Example
//!
//! ```
//! use neutral_ipc_client::protocol::{control, encode_record, format, Record, HEADER_SIZE};
//!
//! let bytes = encode_record(control::PARSE_TEMPLATE, format::JSON, "{}", format::TEXT, "hi").unwrap();
//! assert_eq!(bytes.len(), HEADER_SIZE + 2 + 2);
//!
//! let record = Record::decode(&bytes[..HEADER_SIZE], "{}", "hi").unwrap();
//! assert_eq!(record.control(), control::PARSE_TEMPLATE);
//! assert_eq!(record.content2(), b"hi");
//! ```

use bytes::Bytes;

use super::wire_format::{Header, HEADER_SIZE};
use crate::error::{IpcError, Result};

/// A complete protocol record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Decoded header.
    pub header: Header,
    /// Segment 1 bytes (schema on requests, inner result on responses).
    pub content1: Bytes,
    /// Segment 2 bytes (template reference on requests, rendered output on responses).
    pub content2: Bytes,
}

impl Record {
    /// Build a record, computing both lengths from the actual byte length of each segment.
    ///
    /// `content1` may be text or raw bytes; `content2` is always text.
    pub fn new(
        control: u8,
        format1: u8,
        content1: impl AsRef<[u8]>,
        format2: u8,
        content2: &str,
    ) -> Result<Self> {
        let content1 = Bytes::copy_from_slice(content1.as_ref());
        let content2 = Bytes::copy_from_slice(content2.as_bytes());
        let header = Header::new(
            control,
            format1,
            segment_len(&content1)?,
            format2,
            segment_len(&content2)?,
        );
        Ok(Self {
            header,
            content1,
            content2,
        })
    }

    /// Re-decode `header` and package it with segments that were already read.
    ///
    /// Fails if the header is not exactly `HEADER_SIZE` bytes.
    pub fn decode(
        header: &[u8],
        content1: impl Into<Bytes>,
        content2: impl Into<Bytes>,
    ) -> Result<Self> {
        Ok(Self {
            header: Header::decode(header)?,
            content1: content1.into(),
            content2: content2.into(),
        })
    }

    /// Encode the record as a single contiguous buffer: header, segment 1, segment 2.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&self.header.encode());
        buf.extend_from_slice(&self.content1);
        buf.extend_from_slice(&self.content2);
        buf
    }

    /// Size of the encoded record in bytes.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.content1.len() + self.content2.len()
    }

    #[inline]
    pub fn reserved(&self) -> u8 {
        self.header.reserved
    }

    #[inline]
    pub fn control(&self) -> u8 {
        self.header.control
    }

    #[inline]
    pub fn format1(&self) -> u8 {
        self.header.format1
    }

    #[inline]
    pub fn format2(&self) -> u8 {
        self.header.format2
    }

    #[inline]
    pub fn content1(&self) -> &[u8] {
        &self.content1
    }

    #[inline]
    pub fn content2(&self) -> &[u8] {
        &self.content2
    }

    /// Segment 1 as text. Invalid UTF-8 is replaced, never rejected.
    pub fn content1_text(&self) -> String {
        String::from_utf8_lossy(&self.content1).into_owned()
    }

    /// Segment 2 as text. Invalid UTF-8 is replaced, never rejected.
    pub fn content2_text(&self) -> String {
        String::from_utf8_lossy(&self.content2).into_owned()
    }
}

/// Encode a request record straight to bytes.
///
/// Lengths are byte lengths, so multi-byte text is framed correctly.
pub fn encode_record(
    control: u8,
    format1: u8,
    content1: impl AsRef<[u8]>,
    format2: u8,
    content2: &str,
) -> Result<Vec<u8>> {
    Ok(Record::new(control, format1, content1, format2, content2)?.encode())
}

fn segment_len(content: &[u8]) -> Result<u32> {
    u32::try_from(content.len()).map_err(|_| IpcError::ContentTooLarge(content.len()))
}
