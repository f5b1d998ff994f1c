//! # BlazeKV - An In-Memory Key-Value Store with Crash Recovery
//!
//! BlazeKV is a Redis-compatible, in-memory key-value store written in
//! Rust. It speaks a practical subset of RESP (including the RESP3 map
//! and null framings) and recovers its state after a restart by replaying
//! an append-only log of mutating commands.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                             BlazeKV                                │
//! │                                                                    │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐             │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │             │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │             │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘             │
//! │                            │                  │                    │
//! │                            ▼                  ▼                    │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────────┐    │
//! │  │   RESP      │    │  Append-    │    │        Store         │    │
//! │  │   Codec     │    │  Only Log   │    │ ┌────────┐ ┌───────┐ │    │
//! │  │             │    │  (AOF)      │    │ │strings │ │hashes │ │    │
//! │  └─────────────┘    └─────────────┘    │ │RwLock  │ │RwLock │ │    │
//! │                            ▲           │ └────────┘ └───────┘ │    │
//! │                            │           └──────────────────────┘    │
//! │                     replayed once                                  │
//! │                      at startup                                    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use blazekv::aof::Aof;
//! use blazekv::commands::CommandHandler;
//! use blazekv::connection::{handle_connection, ConnectionStats};
//! use blazekv::storage::Store;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(Store::new());
//!     let aof = Arc::new(Aof::open("database.aof").unwrap());
//!
//!     // Rebuild state from the log before accepting connections.
//!     let mut replayer = CommandHandler::new(Arc::clone(&store));
//!     aof.replay(&mut replayer).unwrap();
//!
//!     let stats = Arc::new(ConnectionStats::new());
//!     let listener = TcpListener::bind("127.0.0.1:6379").await.unwrap();
//!
//!     loop {
//!         let (stream, addr) = listener.accept().await.unwrap();
//!         let commands = CommandHandler::new(Arc::clone(&store));
//!         tokio::spawn(handle_connection(
//!             stream,
//!             addr,
//!             commands,
//!             Some(Arc::clone(&aof)),
//!             Arc::clone(&stats),
//!         ));
//!     }
//! }
//! ```
//!
//! ## Supported Commands
//!
//! ### String Commands
//! - `SET key value [NX|XX] [GET] [EX s|PX ms|EXAT ts|PXAT ts|KEEPTTL]`
//! - `GET key`
//! - `DEL key [key ...]`
//! - `EXISTS [key ...]`
//! - `KEYS pattern` (the pattern is a regular expression)
//!
//! ### Hash Commands
//! - `HSET hash field value [field value ...]`
//! - `HGET hash field`
//! - `HGETALL hash`
//!
//! ### Connection Commands
//! - `HELLO [protover]` (upgrades the connection to RESP3 when given `3`)
//! - `PING`
//! - `ECHO message`
//! - `COMMAND`
//!
//! ## Module Overview
//!
//! - [`protocol`]: RESP codec — value model, incremental parser, serializer
//! - [`storage`]: the two locked keyspaces with lazy per-key expiration
//! - [`commands`]: command dispatch and execution
//! - [`aof`]: the append-only durability log and its replay
//! - [`connection`]: client connection management
//!
//! ## Design Highlights
//!
//! ### Per-connection protocol version
//!
//! `HELLO 3` changes how nulls and maps are framed — for that connection
//! only. The negotiated version lives in the connection's own command
//! handler, so concurrent clients never race on it.
//!
//! ### Lazy expiry, no sweeper
//!
//! Expiration deadlines are absolute epoch seconds checked when GET
//! touches an entry; there is no background task. Reads that skip the
//! check (EXISTS, KEYS, the hash commands) reproduce the engine's
//! baseline semantics.
//!
//! ### Append-only durability
//!
//! The log is the wire encoding of every accepted mutating request,
//! replayed through the ordinary dispatch path at startup. One code path
//! decodes live traffic and recovery data.

pub mod aof;
pub mod commands;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use aof::{Aof, ReplayStats};
pub use commands::CommandHandler;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{ParseError, ProtocolVersion, RespParser, RespValue};
pub use storage::Store;

/// The default port BlazeKV listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host BlazeKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of BlazeKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
