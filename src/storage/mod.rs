//! Storage Module
//!
//! This module provides the shared mutable state for BlazeKV: two
//! independently locked keyspaces (flat strings, nested hashes) with
//! per-entry absolute expiration deadlines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │                                                             │
//! │   ┌──────────────────────┐   ┌──────────────────────────┐   │
//! │   │    String keyspace   │   │      Hash keyspace       │   │
//! │   │  RwLock<HashMap<     │   │  RwLock<HashMap<String,  │   │
//! │   │    String, Entry>>   │   │    HashMap<..., Entry>>> │   │
//! │   └──────────────────────┘   └──────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Two locks, not one**: string and hash traffic never contend
//! - **Lazy expiry**: GET deletes dead entries on access; there is no
//!   background sweeper
//! - **Conditional writes**: SET's NX/XX/KEEPTTL resolution happens in a
//!   single critical section

pub mod store;

// Re-export commonly used types
pub use store::{now_unix, Entry, Expiry, SetCondition, SetOutcome, Store};
