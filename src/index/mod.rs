//! Group index and the snapshots handed to the UI.
//!
//! The index owns every group for the life of the process. Each group's lines
//! live in an append-only [`LineLog`]; a [`GroupSnapshot`] shares that log but
//! remembers its length at snapshot time, so later appends never show through.

use crate::model::{GroupKey, LogLine};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

// ===== LineLog =====

/// Append-only, shared sequence of lines.
#[derive(Debug, Clone, Default)]
pub struct LineLog {
    lines: Arc<RwLock<Vec<Arc<LogLine>>>>,
}

impl LineLog {
    fn push(&self, line: LogLine) -> usize {
        let mut lines = self.lines.write().unwrap_or_else(PoisonError::into_inner);
        lines.push(Arc::new(line));
        lines.len()
    }

    /// Copy the first `len` lines.
    fn prefix(&self, len: usize) -> Vec<Arc<LogLine>> {
        let lines = self.lines.read().unwrap_or_else(PoisonError::into_inner);
        lines[..len.min(lines.len())].to_vec()
    }

    fn get(&self, index: usize) -> Option<Arc<LogLine>> {
        let lines = self.lines.read().unwrap_or_else(PoisonError::into_inner);
        lines.get(index).cloned()
    }
}

// ===== Group =====

/// A named accumulation bucket for lines sharing a key.
#[derive(Debug)]
pub struct Group {
    key: GroupKey,
    title: String,
    description: String,
    timestamp: DateTime<Utc>,
    lines: LineLog,
    len: usize,
}

impl Group {
    fn new(key: GroupKey, title: String, description: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            key,
            title,
            description,
            timestamp,
            lines: LineLog::default(),
            len: 0,
        }
    }

    /// Identity of the group.
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    /// Title from the first line that created the group.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Name of the rule that formed the group.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Timestamp of the most recently appended line (creation time if empty).
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.len
    }

    /// No lines yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot {
            key: self.key.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            timestamp: self.timestamp,
            lines: self.lines.clone(),
            len: self.len,
        }
    }
}

// ===== GroupIndex =====

/// Mapping from group key to group. Groups are never evicted.
#[derive(Debug)]
pub struct GroupIndex {
    groups: HashMap<GroupKey, Group>,
}

impl GroupIndex {
    /// An index holding only the two reserved groups, stamped with the current time.
    pub fn new() -> Self {
        Self::with_start_time(Utc::now())
    }

    /// An index holding only the two reserved groups, stamped with `now`.
    pub fn with_start_time(now: DateTime<Utc>) -> Self {
        let mut groups = HashMap::new();
        for key in [GroupKey::ParseFailures, GroupKey::PlainText] {
            let title = key.reserved_title().unwrap_or_default().to_string();
            let description = key.reserved_description().unwrap_or_default().to_string();
            groups.insert(key.clone(), Group::new(key, title, description, now));
        }
        Self { groups }
    }

    /// Append `line` to the group `key`, creating the group if needed.
    ///
    /// An existing group keeps the title and description it was created with;
    /// only its lines and timestamp change.
    pub fn upsert(
        &mut self,
        key: GroupKey,
        title: String,
        description: String,
        line: LogLine,
    ) -> &Group {
        let timestamp = line.timestamp();
        let group = self.groups.entry(key).or_insert_with_key(|key| {
            tracing::debug!(key = %key, title = %title, "Created group");
            Group::new(key.clone(), title, description, timestamp)
        });

        group.len = group.lines.push(line);
        group.timestamp = timestamp;
        group
    }

    /// Live group with `key`.
    pub fn get(&self, key: &GroupKey) -> Option<&Group> {
        self.groups.get(key)
    }

    /// Number of groups, reserved ones included.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// No groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All groups, newest first.
    ///
    /// Ties on timestamp are broken by title descending, then by key, so the
    /// order is fully deterministic.
    pub fn snapshot(&self) -> Snapshot {
        let mut groups: Vec<GroupSnapshot> = self.groups.values().map(Group::snapshot).collect();
        groups.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.title.cmp(&a.title))
                .then_with(|| a.key.cmp(&b.key))
        });
        Snapshot { groups }
    }
}

impl Default for GroupIndex {
    fn default() -> Self {
        Self::new()
    }
}

// ===== Snapshots =====

/// An immutable, ordered view of all groups at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    groups: Vec<GroupSnapshot>,
}

impl Snapshot {
    /// Groups, most recently updated first.
    pub fn groups(&self) -> &[GroupSnapshot] {
        &self.groups
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// No groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Position of the group with `key`.
    pub fn position(&self, key: &GroupKey) -> Option<usize> {
        self.groups.iter().position(|g| &g.key == key)
    }

    /// Group at `index` in snapshot order.
    pub fn get(&self, index: usize) -> Option<&GroupSnapshot> {
        self.groups.get(index)
    }
}

/// One group as it was when the snapshot was taken.
#[derive(Debug, Clone)]
pub struct GroupSnapshot {
    key: GroupKey,
    title: String,
    description: String,
    timestamp: DateTime<Utc>,
    lines: LineLog,
    len: usize,
}

impl GroupSnapshot {
    /// Identity of the group.
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    /// Title from the first line that created the group.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Name of the rule that formed the group.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Timestamp of the most recent line.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Number of lines at snapshot time.
    pub fn len(&self) -> usize {
        self.len
    }

    /// No lines yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Line `index`, if it existed at snapshot time.
    pub fn line(&self, index: usize) -> Option<Arc<LogLine>> {
        if index < self.len {
            self.lines.get(index)
        } else {
            None
        }
    }

    /// Copy of the lines present at snapshot time, in arrival order.
    pub fn lines(&self) -> Vec<Arc<LogLine>> {
        self.lines.prefix(self.len)
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
