//! Bounded log of dispatched commands with relative recall.
//!
//! The log is a ring buffer of at most `capacity` entries. Entries are addressed
//! by their offset from the most recent write: offset 1 is the last entry, offset
//! `n` is the entry written `n - 1` writes before it.

use crate::error::ShellError;
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};

/// Default number of entries kept.
pub const MAX_CHRONO: usize = 128;

/// What produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// An external command that was handed to the operating system.
    External,
    /// The `history` builtin itself.
    Listing,
}

/// An owned copy of a command line accepted for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    text: String,
    kind: EntryKind,
}

impl HistoryEntry {
    /// Copy `text` into a freshly reserved buffer.
    ///
    /// Fails with [`ShellError::AllocationFailure`] when the storage cannot be reserved.
    pub fn new(text: &str, kind: EntryKind) -> Result<Self, ShellError> {
        let mut owned = String::new();
        owned.try_reserve_exact(text.len())?;
        owned.push_str(text);
        Ok(Self { text: owned, kind })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Behaviour of [`HistoryLog::append`] once the log holds `capacity` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Drop the oldest entry to make room.
    #[default]
    EvictOldest,
    /// Refuse the new entry.
    Reject,
}

/// Returned by [`HistoryLog::append`] under [`OverflowPolicy::Reject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryFull;

impl From<HistoryFull> for ShellError {
    fn from(_: HistoryFull) -> Self {
        ShellError::HistoryFull
    }
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    policy: OverflowPolicy,
    written: u64,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(MAX_CHRONO, OverflowPolicy::default())
    }
}

impl HistoryLog {
    /// Create an empty log. A zero capacity is raised to one.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            policy,
            written: 0,
        }
    }

    pub fn append(&mut self, entry: HistoryEntry) -> Result<(), HistoryFull> {
        if self.entries.len() >= self.capacity {
            match self.policy {
                OverflowPolicy::EvictOldest => {
                    if let Some(evicted) = self.entries.pop_front() {
                        log::debug!("history full, evicted {:?}", evicted.text());
                    }
                }
                OverflowPolicy::Reject => return Err(HistoryFull),
            }
        }
        self.entries.push_back(entry);
        self.written += 1;
        Ok(())
    }

    /// The entry `offset` positions back from the end, or `None` when that many
    /// entries are not stored.
    pub fn recall(&self, offset: usize) -> Option<&HistoryEntry> {
        if offset == 0 || offset > self.entries.len() {
            return None;
        }
        self.entries.get(self.entries.len() - offset)
    }

    /// The most recent entry that was not a `history` listing.
    pub fn last_command(&self) -> Option<&HistoryEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.kind() != EntryKind::Listing)
    }

    /// Write up to `limit` most recent entries, most recent first, as `<index> <command>`.
    pub fn show(&self, limit: usize, out: &mut dyn Write) -> io::Result<()> {
        for (index, entry) in self.entries.iter().rev().take(limit).enumerate() {
            writeln!(out, "{} {}", index, entry)?;
        }
        out.flush()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of successful appends, including evicted entries.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Stored entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext(s: &str) -> HistoryEntry {
        HistoryEntry::new(s, EntryKind::External).unwrap()
    }

    fn log_with(lines: &[&str]) -> HistoryLog {
        let mut log = HistoryLog::default();
        for l in lines {
            log.append(ext(l)).unwrap();
        }
        log
    }

    fn shown(log: &HistoryLog, limit: usize) -> String {
        let mut buf = Vec::new();
        log.show(limit, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn append_then_recall_last() {
        let mut log = HistoryLog::default();
        log.append(ext("ls -la")).unwrap();
        assert_eq!(log.recall(1).map(HistoryEntry::text), Some("ls -la"));
        log.append(ext("pwd")).unwrap();
        assert_eq!(log.recall(1).map(HistoryEntry::text), Some("pwd"));
        assert_eq!(log.recall(2).map(HistoryEntry::text), Some("ls -la"));
    }

    #[test]
    fn recall_out_of_range_is_none() {
        let log = log_with(&["a", "b"]);
        assert!(log.recall(0).is_none());
        assert!(log.recall(3).is_none());
        assert!(HistoryLog::default().recall(1).is_none());
    }

    #[test]
    fn show_lists_most_recent_first() {
        let log = log_with(&["a", "b", "c"]);
        assert_eq!(shown(&log, 10), "0 c\n1 b\n2 a\n");
        assert_eq!(shown(&log, 2), "0 c\n1 b\n");
        assert_eq!(shown(&HistoryLog::default(), 10), "");
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut log = HistoryLog::new(3, OverflowPolicy::EvictOldest);
        for l in ["a", "b", "c", "d"] {
            log.append(ext(l)).unwrap();
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.written(), 4);
        let texts: Vec<&str> = log.iter().map(HistoryEntry::text).collect();
        assert_eq!(texts, vec!["b", "c", "d"]);
        assert_eq!(log.recall(3).map(HistoryEntry::text), Some("b"));
        assert!(log.recall(4).is_none());
    }

    #[test]
    fn reject_policy_refuses_when_full() {
        let mut log = HistoryLog::new(2, OverflowPolicy::Reject);
        log.append(ext("a")).unwrap();
        log.append(ext("b")).unwrap();
        assert_eq!(log.append(ext("c")), Err(HistoryFull));
        assert_eq!(log.len(), 2);
        assert_eq!(log.recall(1).map(HistoryEntry::text), Some("b"));
    }

    #[test]
    fn last_command_skips_listings() {
        let mut log = log_with(&["ls"]);
        log.append(HistoryEntry::new("history", EntryKind::Listing).unwrap())
            .unwrap();
        assert_eq!(log.recall(1).map(HistoryEntry::text), Some("history"));
        assert_eq!(log.last_command().map(HistoryEntry::text), Some("ls"));
    }

    #[test]
    fn zero_capacity_is_raised() {
        assert_eq!(HistoryLog::new(0, OverflowPolicy::Reject).capacity(), 1);
    }
}
