//! Command Engine Module
//!
//! This module implements the command processing layer for BlazeKV.
//! It receives parsed RESP requests, executes them against the store,
//! and returns response values.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  RESP Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Store       │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - Strings: `SET`, `GET`, `DEL`, `EXISTS`, `KEYS`
//! - Hashes: `HSET`, `HGET`, `HGETALL`
//! - Connection: `HELLO`, `PING`, `ECHO`, `COMMAND`
//!
//! Mutating commands (`SET`, `HSET`, `DEL`) are the ones the connection
//! loop records in the durability log; [`is_write_command`] is the single
//! source of truth for that set.

pub mod handler;

// Re-export the main command handler and the log-classification helpers
pub use handler::{command_name, is_write_command, CommandHandler};
