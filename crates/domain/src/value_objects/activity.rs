//! Bounded faction activity log

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// Maximum entries retained per faction; older entries are dropped.
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Created,
    Joined,
    Left,
    Kicked,
    Invited,
    Promoted,
    Demoted,
    LeaderTransferred,
    Renamed,
    SettingsChanged,
    Claimed,
    Unclaimed,
    Overclaimed,
    TerritoryLost,
    HomeSet,
    HomeCleared,
    RelationChanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub at: DateTime<Utc>,
    pub actor: Option<PlayerId>,
    pub kind: ActivityKind,
    pub detail: String,
}

impl ActivityEntry {
    pub fn new(
        at: DateTime<Utc>,
        actor: Option<PlayerId>,
        kind: ActivityKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            at,
            actor,
            kind,
            detail: detail.into(),
        }
    }
}

/// Most-recent-first log holding at most [`ACTIVITY_LOG_CAPACITY`] entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ActivityEntry>", into = "Vec<ActivityEntry>")]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, entry: ActivityEntry) -> Self {
        self.entries.push_front(entry);
        self.entries.truncate(ACTIVITY_LOG_CAPACITY);
        self
    }

    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<ActivityEntry>> for ActivityLog {
    fn from(mut entries: Vec<ActivityEntry>) -> Self {
        entries.truncate(ACTIVITY_LOG_CAPACITY);
        Self {
            entries: entries.into(),
        }
    }
}

impl From<ActivityLog> for Vec<ActivityEntry> {
    fn from(log: ActivityLog) -> Self {
        log.entries.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> ActivityEntry {
        ActivityEntry::new(Utc::now(), None, ActivityKind::Claimed, format!("#{}", n))
    }

    #[test]
    fn newest_entry_comes_first() {
        let log = ActivityLog::new().with_entry(entry(1)).with_entry(entry(2));
        assert_eq!(log.latest().map(|e| e.detail.as_str()), Some("#2"));
        let details: Vec<_> = log.iter().map(|e| e.detail.clone()).collect();
        assert_eq!(details, vec!["#2", "#1"]);
    }

    #[test]
    fn oldest_entries_are_dropped_at_capacity() {
        let log = (0..ACTIVITY_LOG_CAPACITY + 5).fold(ActivityLog::new(), |log, n| {
            log.with_entry(entry(n))
        });
        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
        assert_eq!(
            log.latest().map(|e| e.detail.clone()),
            Some(format!("#{}", ACTIVITY_LOG_CAPACITY + 4))
        );
        assert!(log.iter().all(|e| e.detail != "#0"));
    }
}
