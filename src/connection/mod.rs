//! Connection Handler Module
//!
//! This module manages individual client connections to BlazeKV.
//! Each client connection is handled by its own async task, allowing
//! the server to handle thousands of concurrent clients efficiently.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                    (main.rs)                                │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        │ accept()
//!                        ▼
//!           ┌────────────────────────┐
//!           │   For each client...   │
//!           └────────────┬───────────┘
//!                        │
//!                        │ spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌───────────┐   ┌────────────┐   ┌─────────┐   ┌────────┐  │
//! │  │ Read bytes│──>│ Parse RESP │──>│ Log if  │──>│ Execute│  │
//! │  └───────────┘   └────────────┘   │ mutating│   └───┬────┘  │
//! │                                   └─────────┘       │       │
//! │                                               ┌─────▼────┐  │
//! │                                               │ Send resp│  │
//! │                                               └──────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Async I/O**: Uses Tokio for non-blocking network operations
//! - **Buffer Management**: Efficient BytesMut buffer for incoming data
//! - **Durability**: Mutating requests are appended to the shared log
//!   before execution
//! - **Per-connection protocol version**: each handler owns its
//!   negotiated RESP version, so `HELLO 3` on one client never changes
//!   another client's framing
//! - **Statistics**: Tracks connection and command metrics

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
