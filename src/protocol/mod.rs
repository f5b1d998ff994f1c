//! RESP Protocol Implementation
//!
//! This module provides the wire codec for the subset of the Redis
//! Serialization Protocol (RESP) that BlazeKV speaks.
//!
//! ## Overview
//!
//! RESP is a simple, binary-safe protocol used by Redis for client-server
//! communication. Requests arrive as arrays of bulk strings; responses use
//! the full value subset (`+ - : $ * % _`). Two response types are framed
//! differently depending on the protocol version a connection negotiated
//! with `HELLO`: see [`types::ProtocolVersion`].
//!
//! ## Modules
//!
//! - `types`: Defines the `RespValue` enum, the protocol version, and serialization
//! - `parser`: Incremental parser for incoming RESP data
//!
//! ## Example
//!
//! ```ignore
//! use blazekv::protocol::{RespValue, ProtocolVersion, parse_message};
//! use bytes::Bytes;
//!
//! // Parsing incoming data
//! let data = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
//! let (value, consumed) = parse_message(data).unwrap().unwrap();
//!
//! // Creating responses
//! let response = RespValue::bulk_string(Bytes::from("Ariz"));
//! let bytes = response.serialize(ProtocolVersion::Resp2);
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_message, ParseError, ParseResult, RespParser};
pub use types::{ProtocolVersion, RespValue};
