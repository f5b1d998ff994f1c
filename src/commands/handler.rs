//! Command Handler Module
//!
//! This module implements the command engine: it receives one decoded
//! request, dispatches on the (case-insensitive) command name, validates
//! arguments, executes against the [`Store`], and returns the response
//! value.
//!
//! ## Supported Commands
//!
//! ### String commands
//! - `SET key value [NX|XX] [GET] [EX s|PX ms|EXAT ts|PXAT ts|KEEPTTL]`
//! - `GET key`
//! - `DEL key [key ...]`
//! - `EXISTS [key ...]`
//! - `KEYS pattern` (pattern is a regular expression)
//!
//! ### Hash commands
//! - `HSET hash field value [field value ...]`
//! - `HGET hash field`
//! - `HGETALL hash`
//!
//! ### Connection commands
//! - `HELLO [protover]`
//! - `PING`
//! - `ECHO message`
//! - `COMMAND`
//!
//! ## Error discipline
//!
//! A handler never returns `Err` to the dispatcher. Everything a client
//! can get wrong (arity, unknown options, non-integer TTLs, bad patterns,
//! unknown commands) comes back as a `RespValue::Error` whose message
//! starts with an `ERR` class token, and the connection keeps running.
//!
//! ## Per-connection state
//!
//! Each connection owns its own `CommandHandler`, so the protocol version
//! negotiated by `HELLO` is scoped to that connection and read by every
//! response encode on it.

use crate::protocol::{ProtocolVersion, RespValue};
use crate::storage::{now_unix, Expiry, SetCondition, SetOutcome, Store};
use bytes::Bytes;
use regex::Regex;
use std::sync::Arc;

/// Command names whose accepted requests must be recorded in the
/// durability log. Everything else leaves no trace.
const WRITE_COMMANDS: &[&str] = &["SET", "HSET", "DEL"];

/// Commands the engine knows, as reported by `COMMAND`.
const KNOWN_COMMANDS: &[&str] = &[
    "HELLO", "PING", "ECHO", "COMMAND", "SET", "GET", "DEL", "EXISTS", "KEYS", "HSET", "HGET",
    "HGETALL",
];

/// Returns true if a command with this (uppercased) name mutates the store.
pub fn is_write_command(name: &str) -> bool {
    WRITE_COMMANDS.contains(&name)
}

/// Extracts the uppercased command name from a decoded request, if the
/// request has the expected array-of-strings shape.
pub fn command_name(request: &RespValue) -> Option<String> {
    match request {
        RespValue::Array(args) => args.first().and_then(|v| v.as_str()).map(str::to_uppercase),
        _ => None,
    }
}

/// Executes commands against the shared store.
///
/// One handler is created per connection (and one for log replay); the
/// store behind it is shared, the negotiated protocol version is not.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    /// The shared keyspaces
    store: Arc<Store>,
    /// Protocol version negotiated on this connection via HELLO
    protocol: ProtocolVersion,
}

impl CommandHandler {
    /// Creates a new command handler over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            protocol: ProtocolVersion::default(),
        }
    }

    /// The protocol version this connection currently speaks.
    ///
    /// The connection loop reads this when encoding each response.
    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    /// Executes a command and returns the response.
    ///
    /// # Arguments
    ///
    /// * `command` - The parsed RESP value (should be an array)
    ///
    /// # Returns
    ///
    /// The RESP response to send back to the client.
    pub fn execute(&mut self, command: RespValue) -> RespValue {
        // Commands arrive as arrays of bulk strings
        let args = match command {
            RespValue::Array(args) => args,
            _ => {
                return RespValue::error("ERR invalid command format");
            }
        };

        if args.is_empty() {
            return RespValue::error("ERR empty command");
        }

        // Extract command name (first argument)
        let cmd_name = match args[0].as_str() {
            Some(s) => s.to_uppercase(),
            None => return RespValue::error("ERR invalid command name"),
        };

        self.dispatch(&cmd_name, &args[1..])
    }

    /// Dispatches a command to its handler.
    fn dispatch(&mut self, cmd: &str, args: &[RespValue]) -> RespValue {
        match cmd {
            // Connection commands
            "HELLO" => self.cmd_hello(args),
            "PING" => self.cmd_ping(args),
            "ECHO" => self.cmd_echo(args),
            "COMMAND" => self.cmd_command(args),

            // String commands
            "SET" => self.cmd_set(args),
            "GET" => self.cmd_get(args),
            "DEL" => self.cmd_del(args),
            "EXISTS" => self.cmd_exists(args),
            "KEYS" => self.cmd_keys(args),

            // Hash commands
            "HSET" => self.cmd_hset(args),
            "HGET" => self.cmd_hget(args),
            "HGETALL" => self.cmd_hgetall(args),

            // Unknown command
            _ => RespValue::error(format!("ERR unknown command '{}'", cmd)),
        }
    }

    // ========================================================================
    // Helper functions
    // ========================================================================

    /// Extracts a Bytes value from a RespValue.
    fn get_bytes(&self, value: &RespValue) -> Option<Bytes> {
        match value {
            RespValue::BulkString(b) => Some(b.clone()),
            RespValue::SimpleString(s) => Some(Bytes::from(s.clone())),
            _ => None,
        }
    }

    /// Extracts a string from a RespValue.
    fn get_string(&self, value: &RespValue) -> Option<String> {
        match value {
            RespValue::BulkString(b) => std::str::from_utf8(b).ok().map(|s| s.to_string()),
            RespValue::SimpleString(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Extracts an integer from a RespValue.
    fn get_integer(&self, value: &RespValue) -> Option<i64> {
        match value {
            RespValue::Integer(n) => Some(*n),
            RespValue::BulkString(b) => std::str::from_utf8(b).ok().and_then(|s| s.parse().ok()),
            RespValue::SimpleString(s) => s.parse().ok(),
            _ => None,
        }
    }

    // ========================================================================
    // Connection Commands
    // ========================================================================

    /// HELLO [protover]
    ///
    /// `HELLO 3` upgrades this connection to RESP3 and answers with a map;
    /// any other form answers with a flat array and leaves the version
    /// untouched.
    fn cmd_hello(&mut self, args: &[RespValue]) -> RespValue {
        let upgrade = args.len() == 1 && self.get_string(&args[0]).as_deref() == Some("3");
        if upgrade {
            self.protocol = ProtocolVersion::Resp3;
        }

        let payload = vec![
            RespValue::bulk_string(Bytes::from("server")),
            RespValue::bulk_string(Bytes::from("blazekv")),
            RespValue::bulk_string(Bytes::from("version")),
            RespValue::bulk_string(Bytes::from(env!("CARGO_PKG_VERSION"))),
            RespValue::bulk_string(Bytes::from("proto")),
            RespValue::integer(self.protocol.as_i64()),
            RespValue::bulk_string(Bytes::from("id")),
            RespValue::integer(rand::random::<u32>() as i64),
        ];

        if upgrade {
            RespValue::Map(payload)
        } else {
            RespValue::Array(payload)
        }
    }

    /// PING
    fn cmd_ping(&self, _args: &[RespValue]) -> RespValue {
        RespValue::pong()
    }

    /// ECHO message
    fn cmd_echo(&self, args: &[RespValue]) -> RespValue {
        if args.len() != 1 {
            return RespValue::error("ERR wrong number of arguments for 'ECHO' command");
        }

        match self.get_bytes(&args[0]) {
            Some(msg) => RespValue::bulk_string(msg),
            None => RespValue::error("ERR invalid message"),
        }
    }

    /// COMMAND
    fn cmd_command(&self, _args: &[RespValue]) -> RespValue {
        let values: Vec<RespValue> = KNOWN_COMMANDS
            .iter()
            .map(|c| RespValue::bulk_string(Bytes::from(*c)))
            .collect();
        RespValue::array(values)
    }

    // ========================================================================
    // String Commands
    // ========================================================================

    /// SET key value [NX|XX] [GET] [EX s|PX ms|EXAT ts|PXAT ts|KEEPTTL]
    fn cmd_set(&self, args: &[RespValue]) -> RespValue {
        if args.len() < 2 {
            return RespValue::error("ERR wrong number of arguments for 'SET' command");
        }

        let key = match self.get_string(&args[0]) {
            Some(k) => k,
            None => return RespValue::error("ERR invalid key"),
        };

        let value = match self.get_bytes(&args[1]) {
            Some(v) => v,
            None => return RespValue::error("ERR invalid value"),
        };

        // Parse trailing options left to right. NX/XX: last one wins.
        // At most one TTL directive is meaningful; a later one overrides.
        let mut condition: Option<SetCondition> = None;
        let mut return_previous = false;
        let mut expiry = Expiry::Never;

        let mut i = 2;
        while i < args.len() {
            let opt = match self.get_string(&args[i]) {
                Some(s) => s.to_uppercase(),
                None => return RespValue::error("ERR invalid option"),
            };

            match opt.as_str() {
                "NX" => condition = Some(SetCondition::IfAbsent),
                "XX" => condition = Some(SetCondition::IfPresent),
                "GET" => return_previous = true,
                "KEEPTTL" => expiry = Expiry::Keep,
                "EX" | "PX" | "EXAT" | "PXAT" => {
                    i += 1;
                    if i >= args.len() {
                        return RespValue::error(format!(
                            "ERR value required for '{}' option",
                            opt
                        ));
                    }
                    let n = match self.get_integer(&args[i]) {
                        Some(n) => n,
                        None => {
                            return RespValue::error(format!(
                                "ERR integer required for '{}' option",
                                opt
                            ))
                        }
                    };
                    // Deadlines are stored as absolute epoch seconds.
                    let deadline = match opt.as_str() {
                        "EX" => now_unix() + n,
                        "PX" => now_unix() + n / 1000,
                        "EXAT" => n,
                        _ => n / 1000, // PXAT
                    };
                    expiry = Expiry::At(deadline);
                }
                _ => return RespValue::error(format!("ERR invalid option '{}'", opt)),
            }
            i += 1;
        }

        match self.store.set_string(key, value, expiry, condition) {
            SetOutcome::ConditionFailed => RespValue::null(),
            SetOutcome::Written { previous } => {
                if return_previous {
                    match previous {
                        Some(v) => RespValue::bulk_string(v),
                        None => RespValue::null(),
                    }
                } else {
                    RespValue::ok()
                }
            }
        }
    }

    /// GET key
    fn cmd_get(&self, args: &[RespValue]) -> RespValue {
        if args.len() != 1 {
            return RespValue::error("ERR wrong number of arguments for 'GET' command");
        }

        let key = match self.get_string(&args[0]) {
            Some(k) => k,
            None => return RespValue::error("ERR invalid key"),
        };

        match self.store.get_string(&key) {
            Some(value) => RespValue::bulk_string(value),
            None => RespValue::null(),
        }
    }

    /// DEL key [key ...]
    fn cmd_del(&self, args: &[RespValue]) -> RespValue {
        if args.is_empty() {
            return RespValue::error("ERR wrong number of arguments for 'DEL' command");
        }

        let keys: Vec<String> = args.iter().filter_map(|a| self.get_string(a)).collect();

        let deleted = self.store.delete_strings(&keys);
        RespValue::integer(deleted as i64)
    }

    /// EXISTS [key ...]
    ///
    /// Counts listed keys currently present. Deliberately skips the
    /// expiration check: a dead-but-unreaped key still counts.
    fn cmd_exists(&self, args: &[RespValue]) -> RespValue {
        let keys: Vec<String> = args.iter().filter_map(|a| self.get_string(a)).collect();

        let count = self.store.count_existing(&keys);
        RespValue::integer(count as i64)
    }

    /// KEYS pattern
    ///
    /// The pattern is compiled as a regular expression.
    fn cmd_keys(&self, args: &[RespValue]) -> RespValue {
        if args.len() != 1 {
            return RespValue::error("ERR wrong number of arguments for 'KEYS' command");
        }

        let pattern = match self.get_string(&args[0]) {
            Some(p) => p,
            None => return RespValue::error("ERR invalid pattern"),
        };

        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(_) => return RespValue::error(format!("ERR invalid pattern '{}'", pattern)),
        };

        let values: Vec<RespValue> = self
            .store
            .keys_matching(&re)
            .into_iter()
            .map(|key| RespValue::bulk_string(Bytes::from(key)))
            .collect();

        RespValue::array(values)
    }

    // ========================================================================
    // Hash Commands
    // ========================================================================

    /// HSET hash field value [field value ...]
    fn cmd_hset(&self, args: &[RespValue]) -> RespValue {
        if args.len() < 3 || args.len() % 2 == 0 {
            return RespValue::error("ERR wrong number of arguments for 'HSET' command");
        }

        let hash = match self.get_string(&args[0]) {
            Some(h) => h,
            None => return RespValue::error("ERR invalid hash name"),
        };

        let mut pairs = Vec::with_capacity((args.len() - 1) / 2);
        for chunk in args[1..].chunks(2) {
            let field = match self.get_string(&chunk[0]) {
                Some(f) => f,
                None => return RespValue::error("ERR invalid field"),
            };
            let value = match self.get_bytes(&chunk[1]) {
                Some(v) => v,
                None => return RespValue::error("ERR invalid value"),
            };
            pairs.push((field, value));
        }

        let written = self.store.hash_set(hash, pairs);
        RespValue::integer(written as i64)
    }

    /// HGET hash field
    fn cmd_hget(&self, args: &[RespValue]) -> RespValue {
        if args.len() != 2 {
            return RespValue::error("ERR wrong number of arguments for 'HGET' command");
        }

        let hash = match self.get_string(&args[0]) {
            Some(h) => h,
            None => return RespValue::error("ERR invalid hash name"),
        };
        let field = match self.get_string(&args[1]) {
            Some(f) => f,
            None => return RespValue::error("ERR invalid field"),
        };

        match self.store.hash_get(&hash, &field) {
            Some(value) => RespValue::bulk_string(value),
            None => RespValue::null(),
        }
    }

    /// HGETALL hash
    ///
    /// Returns the hash's field/value pairs in native iteration order,
    /// framed as a map on RESP3 connections and a flat array on RESP2.
    fn cmd_hgetall(&self, args: &[RespValue]) -> RespValue {
        if args.len() != 1 {
            return RespValue::error("ERR wrong number of arguments for 'HGETALL' command");
        }

        let hash = match self.get_string(&args[0]) {
            Some(h) => h,
            None => return RespValue::error("ERR invalid hash name"),
        };

        let pairs = match self.store.hash_get_all(&hash) {
            Some(pairs) => pairs,
            None => return RespValue::null(),
        };

        let mut values = Vec::with_capacity(pairs.len() * 2);
        for (field, value) in pairs {
            values.push(RespValue::bulk_string(Bytes::from(field)));
            values.push(RespValue::bulk_string(value));
        }

        match self.protocol {
            ProtocolVersion::Resp3 => RespValue::Map(values),
            ProtocolVersion::Resp2 => RespValue::Array(values),
        }
    }
}
