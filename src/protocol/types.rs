//! RESP (Redis Serialization Protocol) Data Types
//!
//! This module defines the data types used in the RESP protocol.
//! RESP is a simple, binary-safe protocol that Redis uses for client-server
//! communication; BlazeKV speaks the practical subset of it.
//!
//! ## Protocol Format
//!
//! Each RESP type starts with a type prefix byte:
//! - `+` Simple String
//! - `-` Error
//! - `:` Integer
//! - `$` Bulk String
//! - `*` Array
//! - `%` Map (RESP3)
//! - `_` Null (RESP3)
//!
//! All types are terminated with CRLF (`\r\n`).
//!
//! ## Examples
//!
//! Simple String: `+OK\r\n`
//! Error: `-ERR unknown command\r\n`
//! Integer: `:1000\r\n`
//! Bulk String: `$5\r\nhello\r\n`
//! Array: `*2\r\n$3\r\nGET\r\n$4\r\nname\r\n`
//! Map: `%1\r\n$5\r\nproto\r\n:3\r\n`
//! Null: `_\r\n` (RESP3) or `$-1\r\n` (RESP2 legacy framing)
//!
//! ## Protocol versions
//!
//! A client starts on RESP2 and may upgrade the connection to RESP3 with
//! `HELLO 3`. The negotiated version changes how two types are framed on
//! the wire: `Null` is `_\r\n` on RESP3 but the legacy null bulk string
//! `$-1\r\n` on RESP2, and `Map` responses are only produced when the
//! connection runs RESP3 (RESP2 clients get the same pairs as a flat
//! array). Serialization therefore takes the connection's
//! [`ProtocolVersion`].

use bytes::Bytes;
use std::fmt;

/// The CRLF terminator used in RESP protocol
pub const CRLF: &[u8] = b"\r\n";

/// RESP protocol type prefixes
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';
    pub const MAP: u8 = b'%';
    pub const NULL: u8 = b'_';
}

/// The wire protocol version negotiated for a connection.
///
/// Every connection starts on [`ProtocolVersion::Resp2`]; the `HELLO 3`
/// command upgrades it. The version is per-connection state, so two
/// clients negotiating different versions never interfere with each
/// other's response framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVersion {
    /// The legacy protocol: nulls are `$-1\r\n`, maps are flattened arrays.
    #[default]
    Resp2,
    /// The extended protocol: first-class `_\r\n` nulls and `%` maps.
    Resp3,
}

impl ProtocolVersion {
    /// The numeric version reported by `HELLO`.
    pub fn as_i64(self) -> i64 {
        match self {
            ProtocolVersion::Resp2 => 2,
            ProtocolVersion::Resp3 => 3,
        }
    }
}

/// Represents a value in the RESP protocol.
///
/// This enum covers every protocol datum BlazeKV decodes or encodes and
/// every in-memory command result.
///
/// `Map` and `Array` share the same flat `Vec<RespValue>` representation:
/// a map is an alternating key/value sequence and the distinction only
/// matters at encoding time, where a map frames a pair count of `len / 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    /// Simple strings are used for non-binary safe strings.
    /// They cannot contain CRLF characters.
    /// Format: `+<string>\r\n`
    SimpleString(String),

    /// Errors are similar to simple strings but indicate an error condition.
    /// Format: `-<error message>\r\n`
    Error(String),

    /// 64-bit signed integers.
    /// Format: `:<integer>\r\n`
    Integer(i64),

    /// Bulk strings are binary-safe strings up to 512 MB.
    /// Format: `$<length>\r\n<data>\r\n`
    BulkString(Bytes),

    /// An ordered sequence of values.
    /// Format: `*<count>\r\n<element1><element2>...`
    Array(Vec<RespValue>),

    /// An alternating key/value sequence, framed as a map on RESP3.
    /// Format: `%<count/2>\r\n<key1><value1><key2><value2>...`
    /// The element count must be even.
    Map(Vec<RespValue>),

    /// Null value. Format depends on the negotiated protocol version:
    /// `_\r\n` on RESP3, `$-1\r\n` on RESP2.
    Null,
}

impl RespValue {
    /// Creates a new simple string response.
    ///
    /// # Example
    /// ```
    /// use blazekv::protocol::types::RespValue;
    /// let ok = RespValue::simple_string("OK");
    /// ```
    pub fn simple_string(s: impl Into<String>) -> Self {
        RespValue::SimpleString(s.into())
    }

    /// Creates a new error response.
    ///
    /// # Example
    /// ```
    /// use blazekv::protocol::types::RespValue;
    /// let err = RespValue::error("ERR unknown command");
    /// ```
    pub fn error(s: impl Into<String>) -> Self {
        RespValue::Error(s.into())
    }

    /// Creates a new integer response.
    pub fn integer(n: i64) -> Self {
        RespValue::Integer(n)
    }

    /// Creates a new bulk string response.
    pub fn bulk_string(data: impl Into<Bytes>) -> Self {
        RespValue::BulkString(data.into())
    }

    /// Creates a null response.
    pub fn null() -> Self {
        RespValue::Null
    }

    /// Creates an array response.
    pub fn array(values: Vec<RespValue>) -> Self {
        RespValue::Array(values)
    }

    /// Creates a map response from a flat alternating key/value sequence.
    pub fn map(pairs: Vec<RespValue>) -> Self {
        RespValue::Map(pairs)
    }

    /// Common response for successful operations
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    /// Common response for PONG
    pub fn pong() -> Self {
        RespValue::SimpleString("PONG".to_string())
    }

    /// Serializes the RESP value to bytes for sending over the wire.
    ///
    /// Encoding is total: every variant has a defined wire form. The
    /// negotiated protocol version selects the framing for `Null` and is
    /// threaded through nested elements.
    pub fn serialize(&self, proto: ProtocolVersion) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf, proto);
        buf
    }

    /// Serializes the RESP value into an existing buffer.
    ///
    /// This is more efficient than `serialize()` when you want to reuse a buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>, proto: ProtocolVersion) {
        match self {
            RespValue::SimpleString(s) => {
                buf.push(prefix::SIMPLE_STRING);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Error(s) => {
                buf.push(prefix::ERROR);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Integer(n) => {
                buf.push(prefix::INTEGER);
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::BulkString(data) => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(data.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(data);
                buf.extend_from_slice(CRLF);
            }
            RespValue::Array(values) => {
                buf.push(prefix::ARRAY);
                buf.extend_from_slice(values.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for value in values {
                    value.serialize_into(buf, proto);
                }
            }
            RespValue::Map(values) => {
                // A map frames the number of pairs, not elements.
                buf.push(prefix::MAP);
                buf.extend_from_slice((values.len() / 2).to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for value in values {
                    value.serialize_into(buf, proto);
                }
            }
            RespValue::Null => match proto {
                ProtocolVersion::Resp3 => {
                    buf.push(prefix::NULL);
                    buf.extend_from_slice(CRLF);
                }
                ProtocolVersion::Resp2 => {
                    buf.push(prefix::BULK_STRING);
                    buf.extend_from_slice(b"-1");
                    buf.extend_from_slice(CRLF);
                }
            },
        }
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, RespValue::Null)
    }

    /// Returns true if this value is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }

    /// Attempts to extract the inner string from SimpleString or BulkString.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RespValue::SimpleString(s) => Some(s),
            RespValue::BulkString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Attempts to extract the inner bytes from BulkString.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RespValue::BulkString(b) => Some(b),
            _ => None,
        }
    }

    /// Attempts to extract the inner integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RespValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract the inner array.
    pub fn as_array(&self) -> Option<&[RespValue]> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Consumes self and returns the inner array if this is an Array variant.
    pub fn into_array(self) -> Option<Vec<RespValue>> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespValue::SimpleString(s) => write!(f, "\"{}\"", s),
            RespValue::Error(s) => write!(f, "(error) {}", s),
            RespValue::Integer(n) => write!(f, "(integer) {}", n),
            RespValue::BulkString(data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "\"{}\"", s)
                } else {
                    write!(f, "(binary data, {} bytes)", data.len())
                }
            }
            RespValue::Null => write!(f, "(nil)"),
            RespValue::Array(values) | RespValue::Map(values) => {
                if values.is_empty() {
                    write!(f, "(empty)")
                } else {
                    writeln!(f)?;
                    for (i, v) in values.iter().enumerate() {
                        writeln!(f, "{}) {}", i + 1, v)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_string_serialize() {
        let value = RespValue::simple_string("OK");
        assert_eq!(value.serialize(ProtocolVersion::Resp2), b"+OK\r\n");
    }

    #[test]
    fn test_error_serialize() {
        let value = RespValue::error("ERR unknown command");
        assert_eq!(
            value.serialize(ProtocolVersion::Resp2),
            b"-ERR unknown command\r\n"
        );
    }

    #[test]
    fn test_integer_serialize() {
        let value = RespValue::integer(1000);
        assert_eq!(value.serialize(ProtocolVersion::Resp2), b":1000\r\n");

        let negative = RespValue::integer(-42);
        assert_eq!(negative.serialize(ProtocolVersion::Resp2), b":-42\r\n");
    }

    #[test]
    fn test_bulk_string_serialize() {
        let value = RespValue::bulk_string(Bytes::from("hello"));
        assert_eq!(value.serialize(ProtocolVersion::Resp2), b"$5\r\nhello\r\n");
    }

    #[test]
    fn test_null_serialize_is_version_dependent() {
        let value = RespValue::null();
        assert_eq!(value.serialize(ProtocolVersion::Resp2), b"$-1\r\n");
        assert_eq!(value.serialize(ProtocolVersion::Resp3), b"_\r\n");
    }

    #[test]
    fn test_array_serialize() {
        let value = RespValue::array(vec![
            RespValue::bulk_string(Bytes::from("GET")),
            RespValue::bulk_string(Bytes::from("name")),
        ]);
        assert_eq!(
            value.serialize(ProtocolVersion::Resp2),
            b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n"
        );
    }

    #[test]
    fn test_map_frames_pair_count() {
        let value = RespValue::map(vec![
            RespValue::bulk_string(Bytes::from("f1")),
            RespValue::bulk_string(Bytes::from("a")),
            RespValue::bulk_string(Bytes::from("f2")),
            RespValue::bulk_string(Bytes::from("b")),
        ]);
        assert_eq!(
            value.serialize(ProtocolVersion::Resp3),
            b"%2\r\n$2\r\nf1\r\n$1\r\na\r\n$2\r\nf2\r\n$1\r\nb\r\n"
        );
    }

    #[test]
    fn test_nested_null_uses_connection_version() {
        let value = RespValue::array(vec![RespValue::integer(1), RespValue::null()]);
        assert_eq!(value.serialize(ProtocolVersion::Resp3), b"*2\r\n:1\r\n_\r\n");
        assert_eq!(
            value.serialize(ProtocolVersion::Resp2),
            b"*2\r\n:1\r\n$-1\r\n"
        );
    }

    #[test]
    fn test_nested_array_serialize() {
        let value = RespValue::array(vec![
            RespValue::integer(1),
            RespValue::array(vec![RespValue::integer(2), RespValue::integer(3)]),
        ]);
        assert_eq!(
            value.serialize(ProtocolVersion::Resp2),
            b"*2\r\n:1\r\n*2\r\n:2\r\n:3\r\n"
        );
    }

    #[test]
    fn test_ok_response() {
        assert_eq!(RespValue::ok().serialize(ProtocolVersion::Resp2), b"+OK\r\n");
    }

    #[test]
    fn test_pong_response() {
        assert_eq!(
            RespValue::pong().serialize(ProtocolVersion::Resp2),
            b"+PONG\r\n"
        );
    }

    #[test]
    fn test_default_version_is_resp2() {
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::Resp2);
        assert_eq!(ProtocolVersion::Resp2.as_i64(), 2);
        assert_eq!(ProtocolVersion::Resp3.as_i64(), 3);
    }
}
