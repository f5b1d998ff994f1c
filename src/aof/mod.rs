//! Append-Only File Durability Log
//!
//! This module gives BlazeKV crash recovery: every accepted mutating
//! request (`SET`, `HSET`, `DEL`) is appended to a log file in its wire
//! encoding, and on startup the log is replayed through the command
//! engine to rebuild the store.
//!
//! ## File format
//!
//! The log is nothing but concatenated wire-encoded request arrays —
//! no header, no record separators beyond RESP's own framing, no
//! checksums. The same parser that decodes live traffic decodes the log.
//!
//! ## Append discipline
//!
//! Appends happen under a dedicated mutex so that concurrent connection
//! tasks never interleave partial writes; the log preserves the order in
//! which mutating requests were accepted. Each append is flushed before
//! the lock is released — a blocking write, trading throughput for
//! simplicity.
//!
//! ## Replay discipline
//!
//! Replay runs before the listener accepts connections and dispatches
//! each decoded request straight to a [`CommandHandler`] — bypassing the
//! append path, since replay must not re-append what it is replaying.
//! A record that dispatches to an error is logged and skipped. A decode
//! error ends replay early (with no record framing there is nothing to
//! resync on) but never aborts the process. Because SET/HSET/DEL are
//! deterministic, replaying the same log twice lands on the same state.

use crate::commands::CommandHandler;
use crate::protocol::{ProtocolVersion, RespParser, RespValue};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Counters reported by a completed replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    /// Records decoded and applied to the store
    pub applied: usize,
    /// Records decoded but rejected by the command engine
    pub skipped: usize,
}

/// The append-only durability log.
///
/// One `Aof` is opened at startup, wrapped in an `Arc`, and shared by all
/// connection tasks. The mutex around the file handle serializes their
/// appends.
#[derive(Debug)]
pub struct Aof {
    /// Append handle, guarded so concurrent tasks cannot tear a record
    file: Mutex<File>,
    /// Where the log lives, kept for replay and diagnostics
    path: PathBuf,
}

impl Aof {
    /// Opens (creating if necessary) the log file in append mode.
    ///
    /// Failure here is fatal to startup: a server that cannot persist
    /// must not pretend it can.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        info!(path = %path.display(), "opened append-only log");

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// The log file's location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one wire-encoded request to the log and flushes it.
    ///
    /// Requests are arrays of bulk strings, whose framing is identical on
    /// both protocol versions, so the encoding here is version-neutral.
    pub fn append(&self, request: &RespValue) -> io::Result<()> {
        let bytes = request.serialize(ProtocolVersion::Resp2);

        let mut file = self.file.lock().unwrap();
        file.write_all(&bytes)?;
        file.flush()
    }

    /// Replays the whole log through the given command handler.
    ///
    /// Call this once at startup, before accepting connections, with a
    /// handler that does not append (the handler never appends; only the
    /// connection loop does, which is exactly why replay can share it).
    pub fn replay(&self, handler: &mut CommandHandler) -> io::Result<ReplayStats> {
        let buf = std::fs::read(&self.path)?;
        let mut parser = RespParser::new();
        let mut stats = ReplayStats::default();
        let mut pos = 0;

        while pos < buf.len() {
            match parser.parse(&buf[pos..]) {
                Ok(Some((request, consumed))) => {
                    pos += consumed;
                    let response = handler.execute(request);
                    if let RespValue::Error(message) = response {
                        // A bad record does not poison the rest of the log.
                        warn!(%message, "skipping unreplayable log record");
                        stats.skipped += 1;
                    } else {
                        stats.applied += 1;
                    }
                }
                Ok(None) => {
                    // Torn final record, e.g. a crash mid-append.
                    warn!(
                        path = %self.path.display(),
                        offset = pos,
                        "log ends with a partial record, ignoring it"
                    );
                    break;
                }
                Err(e) => {
                    // No record framing exists to resync on, so a decode
                    // error ends replay; the server still starts.
                    warn!(
                        path = %self.path.display(),
                        offset = pos,
                        error = %e,
                        "undecodable log record, stopping replay early"
                    );
                    break;
                }
            }
        }

        debug!(
            applied = stats.applied,
            skipped = stats.skipped,
            "log replay finished"
        );

        Ok(stats)
    }
}
