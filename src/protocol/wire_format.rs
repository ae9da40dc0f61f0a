//! Wire format encoding and decoding.
//!
//! Implements the 12-byte record header:
//! ```text
//! ┌──────────┬─────────┬──────────┬──────────┬──────────┬──────────┐
//! │ Reserved │ Control │ Format 1 │ Length 1 │ Format 2 │ Length 2 │
//! │ 1 byte   │ 1 byte  │ 1 byte   │ uint32 BE│ 1 byte   │ uint32 BE│
//! └──────────┴─────────┴──────────┴──────────┴──────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Big Endian. Control and format bytes are
//! opaque to the codec: unknown values pass through unchanged.

use crate::error::{IpcError, Result};

/// Header size in bytes (fixed, exactly 12).
pub const HEADER_SIZE: usize = 12;

/// Value written to the reserved byte of every outgoing header.
pub const RESERVED: u8 = 0;

/// Control codes: request opcodes and response status classes.
pub mod control {
    /// Request: parse a template against a schema.
    pub const PARSE_TEMPLATE: u8 = 10;
    /// Response: the service handled the request.
    pub const STATUS_OK: u8 = 0;
    /// Response: the service failed to handle the request.
    pub const STATUS_KO: u8 = 1;
}

/// Content-type tags for the two segments.
pub mod format {
    /// JSON text.
    pub const JSON: u8 = 10;
    /// Filesystem path resolvable by the service.
    pub const PATH: u8 = 20;
    /// Raw text (inline template source).
    pub const TEXT: u8 = 30;
    /// Raw binary.
    pub const BIN: u8 = 40;
    /// MessagePack-serialized map.
    pub const MSGPACK: u8 = 50;
}

/// Decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    /// Reserved byte (always 0 on the wire from this client).
    pub reserved: u8,
    /// Request opcode or response status class (see `control`).
    pub control: u8,
    /// Content-type tag of segment 1 (see `format`).
    pub format1: u8,
    /// Byte length of segment 1.
    pub length1: u32,
    /// Content-type tag of segment 2 (see `format`).
    pub format2: u8,
    /// Byte length of segment 2.
    pub length2: u32,
}

impl Header {
    /// Create a new header with the reserved byte cleared.
    pub fn new(control: u8, format1: u8, length1: u32, format2: u8, length2: u32) -> Self {
        Self {
            reserved: RESERVED,
            control,
            format1,
            length1,
            format2,
            length2,
        }
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use neutral_ipc_client::protocol::{control, format, Header};
    ///
    /// let header = Header::new(control::PARSE_TEMPLATE, format::JSON, 2, format::PATH, 9);
    /// let bytes = header.encode();
    /// assert_eq!(bytes.len(), 12);
    /// assert_eq!(bytes[1], 10);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0] = RESERVED;
        buf[1] = self.control;
        buf[2] = self.format1;
        buf[3..7].copy_from_slice(&self.length1.to_be_bytes());
        buf[7] = self.format2;
        buf[8..12].copy_from_slice(&self.length2.to_be_bytes());
        buf
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Fails unless exactly `HEADER_SIZE` bytes are supplied.
    ///
    /// # Example
    ///
    /// ```
    /// use neutral_ipc_client::protocol::Header;
    ///
    /// let bytes = [0, 0, 10, 0, 0, 0, 2, 30, 0, 0, 1, 0];
    /// let header = Header::decode(&bytes).unwrap();
    /// assert_eq!(header.format1, 10);
    /// assert_eq!(header.length1, 2);
    /// assert_eq!(header.length2, 256);
    /// ```
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != HEADER_SIZE {
            return Err(IpcError::InvalidHeaderLength {
                expected: HEADER_SIZE,
                actual: buf.len(),
            });
        }
        Ok(Self {
            reserved: buf[0],
            control: buf[1],
            format1: buf[2],
            length1: u32::from_be_bytes([buf[3], buf[4], buf[5], buf[6]]),
            format2: buf[7],
            length2: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
        })
    }

    /// Check if the response control byte reports success.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.control == control::STATUS_OK
    }

    /// Total number of content bytes following the header.
    #[inline]
    pub fn content_len(&self) -> u64 {
        u64::from(self.length1) + u64::from(self.length2)
    }
}

/// Encode a header to bytes (standalone function).
#[inline]
pub fn encode_header(header: &Header) -> [u8; HEADER_SIZE] {
    header.encode()
}

/// Decode a header from bytes (standalone function).
#[inline]
pub fn decode_header(buf: &[u8]) -> Result<Header> {
    Header::decode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_encode_decode_roundtrip() {
        let original = Header::new(control::PARSE_TEMPLATE, format::JSON, 42, format::PATH, 100);
        let decoded = Header::decode(&original.encode()).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_header_big_endian_byte_order() {
        let header = Header::new(0x01, 0x02, 0x03040506, 0x07, 0x08090A0B);
        let bytes = header.encode();

        assert_eq!(bytes[0], RESERVED);
        assert_eq!(bytes[1], 0x01);
        assert_eq!(bytes[2], 0x02);
        assert_eq!(&bytes[3..7], &[0x03, 0x04, 0x05, 0x06]);
        assert_eq!(bytes[7], 0x07);
        assert_eq!(&bytes[8..12], &[0x08, 0x09, 0x0A, 0x0B]);
    }

    #[test]
    fn test_header_size_is_exactly_12() {
        assert_eq!(HEADER_SIZE, 12);
        assert_eq!(Header::default().encode().len(), 12);
    }

    #[test]
    fn test_decode_rejects_short_and_long_buffers() {
        for len in [0usize, 11, 13] {
            let buf = vec![0u8; len];
            match Header::decode(&buf) {
                Err(IpcError::InvalidHeaderLength { expected, actual }) => {
                    assert_eq!(expected, HEADER_SIZE);
                    assert_eq!(actual, len);
                }
                other => panic!("Expected InvalidHeaderLength, got: {:?}", other),
            }
        }
    }

    #[test]
    fn test_unknown_codes_pass_through() {
        let header = Header::new(0xEE, 0x7F, 1, 0xFF, 2);
        let decoded = Header::decode(&header.encode()).unwrap();
        assert_eq!(decoded.control, 0xEE);
        assert_eq!(decoded.format1, 0x7F);
        assert_eq!(decoded.format2, 0xFF);
    }

    #[test]
    fn test_encode_always_clears_reserved_byte() {
        let mut header = Header::new(control::STATUS_OK, format::JSON, 0, format::TEXT, 0);
        header.reserved = 9;
        assert_eq!(header.encode()[0], RESERVED);
    }

    #[test]
    fn test_decode_preserves_received_reserved_byte() {
        let mut bytes = Header::default().encode();
        bytes[0] = 7;
        assert_eq!(Header::decode(&bytes).unwrap().reserved, 7);
    }

    #[test]
    fn test_min_max_lengths() {
        let header = Header::new(control::STATUS_KO, format::BIN, u32::MAX, format::MSGPACK, 0);
        let decoded = Header::decode(&header.encode()).unwrap();
        assert_eq!(decoded.length1, u32::MAX);
        assert_eq!(decoded.length2, 0);
        assert_eq!(decoded.content_len(), u64::from(u32::MAX));
        assert!(!decoded.is_ok());
    }

    #[test]
    fn test_standalone_functions() {
        let header = Header::new(control::PARSE_TEMPLATE, format::JSON, 3, format::TEXT, 4);
        let encoded = encode_header(&header);
        assert_eq!(decode_header(&encoded).unwrap(), header);
    }
}
