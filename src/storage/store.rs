//! Dual-Keyspace In-Memory Store
//!
//! This module implements the mutable state behind the command engine:
//! a flat string keyspace and a nested hash keyspace, each guarded by its
//! own `RwLock`. The two locks are independent, so a SET never contends
//! with an HSET.
//!
//! ## Design Decisions
//!
//! 1. **Handlers are the only callers**: the keyspace operations are
//!    `pub(crate)`. Nothing outside the crate mutates a keyspace except
//!    through a command.
//! 2. **Short critical sections**: every operation acquires the lock it
//!    needs for the span of its read-modify-write and releases it before
//!    the caller builds a response value. `std::sync::RwLock` is fine here
//!    because no lock is ever held across an `.await`.
//! 3. **Lazy expiry on GET only**: an entry past its deadline is deleted
//!    and reported as a miss when GET touches it. EXISTS, KEYS and the
//!    hash reads deliberately do not check deadlines, reproducing the
//!    baseline semantics this engine recovers from its log.
//! 4. **Hash fields never expire**: fields written by HSET always carry
//!    `expires_at: None`.

use bytes::Bytes;
use regex::Regex;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as whole seconds since the Unix epoch.
///
/// Expiration deadlines are absolute epoch seconds, so this is the only
/// clock the store consults.
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// A stored value with an optional absolute expiration deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The actual value stored
    pub value: Bytes,
    /// Unix-epoch-seconds deadline after which the entry is dead.
    /// `None` means the entry never expires.
    pub expires_at: Option<i64>,
}

impl Entry {
    /// Creates an entry without expiration.
    pub fn new(value: Bytes) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Creates an entry with an absolute deadline in epoch seconds.
    pub fn with_deadline(value: Bytes, deadline: i64) -> Self {
        Self {
            value,
            expires_at: Some(deadline),
        }
    }

    /// An entry is dead once read strictly after its deadline.
    #[inline]
    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline < now)
    }
}

/// How a SET resolves the new entry's expiration deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// No deadline; also clears any previous deadline (plain SET).
    Never,
    /// Preserve the deadline of the entry being overwritten (KEEPTTL).
    Keep,
    /// Absolute Unix-epoch-seconds deadline (EX/PX/EXAT/PXAT, normalized).
    At(i64),
}

/// Existence precondition for SET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetCondition {
    /// Only write if the key is absent (NX).
    IfAbsent,
    /// Only write if the key is present (XX).
    IfPresent,
}

/// Outcome of a conditional string write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// The entry was written; `previous` is the value it replaced, if any.
    Written { previous: Option<Bytes> },
    /// The NX/XX precondition failed; nothing was mutated.
    ConditionFailed,
}

/// The shared mutable state of the server: both keyspaces and their locks.
///
/// A `Store` is constructed once at startup, wrapped in an `Arc`, and
/// handed to every connection's command handler and to the log replay
/// path. Tests construct isolated instances the same way.
#[derive(Debug, Default)]
pub struct Store {
    /// Flat string keyspace.
    strings: RwLock<HashMap<String, Entry>>,
    /// Nested hash keyspace, independently locked.
    hashes: RwLock<HashMap<String, HashMap<String, Entry>>>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // String keyspace
    // ========================================================================

    /// Looks up a string key with the lazy-expiration check.
    ///
    /// An entry past its deadline is removed and reported as a miss.
    pub(crate) fn get_string(&self, key: &str) -> Option<Bytes> {
        let now = now_unix();

        let mut strings = self.strings.write().unwrap();
        match strings.get(key) {
            Some(entry) if entry.is_expired(now) => {
                strings.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Conditionally writes a string key under one lock acquisition.
    ///
    /// The NX/XX check, the KEEPTTL deadline carry-over, and the write
    /// itself all happen inside the same critical section, so concurrent
    /// SETs cannot interleave between check and write.
    pub(crate) fn set_string(
        &self,
        key: String,
        value: Bytes,
        expiry: Expiry,
        condition: Option<SetCondition>,
    ) -> SetOutcome {
        let mut strings = self.strings.write().unwrap();
        let previous = strings.get(&key);

        match condition {
            Some(SetCondition::IfAbsent) if previous.is_some() => return SetOutcome::ConditionFailed,
            Some(SetCondition::IfPresent) if previous.is_none() => {
                return SetOutcome::ConditionFailed
            }
            _ => {}
        }

        let expires_at = match expiry {
            Expiry::Never => None,
            Expiry::Keep => previous.and_then(|e| e.expires_at),
            Expiry::At(deadline) => Some(deadline),
        };

        let previous = strings
            .insert(key, Entry { value, expires_at })
            .map(|e| e.value);

        SetOutcome::Written { previous }
    }

    /// Removes each listed key that exists; returns how many were removed.
    pub(crate) fn delete_strings(&self, keys: &[String]) -> usize {
        let mut strings = self.strings.write().unwrap();
        keys.iter()
            .filter(|key| strings.remove(key.as_str()).is_some())
            .count()
    }

    /// Counts how many of the listed keys are present.
    ///
    /// No expiration check: a dead-but-unreaped entry still counts, as in
    /// the baseline semantics.
    pub(crate) fn count_existing(&self, keys: &[String]) -> usize {
        let strings = self.strings.read().unwrap();
        keys.iter()
            .filter(|key| strings.contains_key(key.as_str()))
            .count()
    }

    /// All string keys whose text matches the compiled pattern.
    pub(crate) fn keys_matching(&self, pattern: &Regex) -> Vec<String> {
        let strings = self.strings.read().unwrap();
        strings
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect()
    }

    // ========================================================================
    // Hash keyspace
    // ========================================================================

    /// Upserts field/value pairs into the named hash, creating it if
    /// absent.
    ///
    /// Pairs are de-duplicated into a scratch map before the merge: if the
    /// same field appears twice in one call, the last value wins, and the
    /// returned count is the number of distinct fields supplied.
    pub(crate) fn hash_set(&self, hash: String, pairs: Vec<(String, Bytes)>) -> usize {
        let mut scratch: HashMap<String, Entry> = HashMap::with_capacity(pairs.len());
        for (field, value) in pairs {
            scratch.insert(field, Entry::new(value));
        }
        let written = scratch.len();

        let mut hashes = self.hashes.write().unwrap();
        hashes.entry(hash).or_default().extend(scratch);

        written
    }

    /// Looks up a single field of a hash. No expiration check.
    pub(crate) fn hash_get(&self, hash: &str, field: &str) -> Option<Bytes> {
        let hashes = self.hashes.read().unwrap();
        hashes
            .get(hash)
            .and_then(|fields| fields.get(field))
            .map(|entry| entry.value.clone())
    }

    /// All field/value pairs of a hash in native iteration order, or
    /// `None` if the hash does not exist.
    pub(crate) fn hash_get_all(&self, hash: &str) -> Option<Vec<(String, Bytes)>> {
        let hashes = self.hashes.read().unwrap();
        hashes.get(hash).map(|fields| {
            fields
                .iter()
                .map(|(field, entry)| (field.clone(), entry.value.clone()))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    #[test]
    fn test_set_then_get() {
        let store = Store::new();
        let outcome = store.set_string("k".into(), bytes("v"), Expiry::Never, None);
        assert_eq!(outcome, SetOutcome::Written { previous: None });
        assert_eq!(store.get_string("k"), Some(bytes("v")));
    }

    #[test]
    fn test_set_reports_previous_value() {
        let store = Store::new();
        store.set_string("k".into(), bytes("v1"), Expiry::Never, None);
        let outcome = store.set_string("k".into(), bytes("v2"), Expiry::Never, None);
        assert_eq!(
            outcome,
            SetOutcome::Written {
                previous: Some(bytes("v1"))
            }
        );
    }

    #[test]
    fn test_set_if_absent_rejects_existing_key() {
        let store = Store::new();
        store.set_string("k".into(), bytes("v1"), Expiry::Never, None);
        let outcome = store.set_string(
            "k".into(),
            bytes("v2"),
            Expiry::Never,
            Some(SetCondition::IfAbsent),
        );
        assert_eq!(outcome, SetOutcome::ConditionFailed);
        assert_eq!(store.get_string("k"), Some(bytes("v1")));
    }

    #[test]
    fn test_set_if_present_rejects_missing_key() {
        let store = Store::new();
        let outcome = store.set_string(
            "missing".into(),
            bytes("v"),
            Expiry::Never,
            Some(SetCondition::IfPresent),
        );
        assert_eq!(outcome, SetOutcome::ConditionFailed);
        assert_eq!(store.get_string("missing"), None);
    }

    #[test]
    fn test_expired_entry_is_deleted_on_get() {
        let store = Store::new();
        store.set_string(
            "k".into(),
            bytes("v"),
            Expiry::At(now_unix() - 10),
            None,
        );
        assert_eq!(store.get_string("k"), None);
        // The reap happened: the key no longer even counts as existing.
        assert_eq!(store.count_existing(&["k".to_string()]), 0);
    }

    #[test]
    fn test_future_deadline_is_still_live() {
        let store = Store::new();
        store.set_string(
            "k".into(),
            bytes("v"),
            Expiry::At(now_unix() + 100),
            None,
        );
        assert_eq!(store.get_string("k"), Some(bytes("v")));
    }

    #[test]
    fn test_keep_preserves_deadline() {
        let store = Store::new();
        let deadline = now_unix() + 100;
        store.set_string("k".into(), bytes("v1"), Expiry::At(deadline), None);
        store.set_string("k".into(), bytes("v2"), Expiry::Keep, None);

        let strings = store.strings.read().unwrap();
        assert_eq!(strings.get("k").unwrap().expires_at, Some(deadline));
        assert_eq!(strings.get("k").unwrap().value, bytes("v2"));
    }

    #[test]
    fn test_plain_set_clears_deadline() {
        let store = Store::new();
        store.set_string("k".into(), bytes("v1"), Expiry::At(now_unix() + 100), None);
        store.set_string("k".into(), bytes("v2"), Expiry::Never, None);

        let strings = store.strings.read().unwrap();
        assert_eq!(strings.get("k").unwrap().expires_at, None);
    }

    #[test]
    fn test_delete_counts_only_removed_keys() {
        let store = Store::new();
        store.set_string("a".into(), bytes("1"), Expiry::Never, None);
        store.set_string("b".into(), bytes("2"), Expiry::Never, None);

        let removed = store.delete_strings(&[
            "a".to_string(),
            "b".to_string(),
            "missing".to_string(),
        ]);
        assert_eq!(removed, 2);
        assert_eq!(store.get_string("a"), None);
    }

    #[test]
    fn test_count_existing_ignores_deadlines() {
        // Baseline semantics: EXISTS does not apply the expiration check.
        let store = Store::new();
        store.set_string("dead".into(), bytes("v"), Expiry::At(now_unix() - 10), None);
        assert_eq!(store.count_existing(&["dead".to_string()]), 1);
    }

    #[test]
    fn test_keys_matching() {
        let store = Store::new();
        for key in ["foo", "bar", "foobar"] {
            store.set_string(key.into(), bytes("v"), Expiry::Never, None);
        }

        let re = Regex::new("foo.*").unwrap();
        let mut keys = store.keys_matching(&re);
        keys.sort();
        assert_eq!(keys, vec!["foo".to_string(), "foobar".to_string()]);
    }

    #[test]
    fn test_hash_set_counts_distinct_fields() {
        let store = Store::new();
        let written = store.hash_set(
            "h".into(),
            vec![
                ("f1".to_string(), bytes("a")),
                ("f2".to_string(), bytes("b")),
                ("f1".to_string(), bytes("c")), // duplicate field, last wins
            ],
        );
        assert_eq!(written, 2);
        assert_eq!(store.hash_get("h", "f1"), Some(bytes("c")));
        assert_eq!(store.hash_get("h", "f2"), Some(bytes("b")));
    }

    #[test]
    fn test_hash_set_merges_into_existing_hash() {
        let store = Store::new();
        store.hash_set("h".into(), vec![("f1".to_string(), bytes("a"))]);
        store.hash_set("h".into(), vec![("f2".to_string(), bytes("b"))]);

        let mut pairs = store.hash_get_all("h").unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("f1".to_string(), bytes("a")),
                ("f2".to_string(), bytes("b")),
            ]
        );
    }

    #[test]
    fn test_hash_get_missing() {
        let store = Store::new();
        assert_eq!(store.hash_get("h", "f"), None);
        assert_eq!(store.hash_get_all("h"), None);
    }

    #[test]
    fn test_hash_fields_never_expire() {
        let store = Store::new();
        store.hash_set("h".into(), vec![("f".to_string(), bytes("v"))]);
        let hashes = store.hashes.read().unwrap();
        assert_eq!(hashes["h"]["f"].expires_at, None);
    }
}
