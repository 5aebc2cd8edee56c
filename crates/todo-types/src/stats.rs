//! Request statistics types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category of a handled request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Create,
    Read,
    Update,
    Delete,
    Error,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::Create,
        EventCategory::Read,
        EventCategory::Update,
        EventCategory::Delete,
        EventCategory::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Create => "create",
            EventCategory::Read => "read",
            EventCategory::Update => "update",
            EventCategory::Delete => "delete",
            EventCategory::Error => "error",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable copy of one statistics window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub start: DateTime<Utc>,
    pub duration_ms: u64,
    pub counts: BTreeMap<EventCategory, u64>,
}

impl StatSnapshot {
    pub fn count(&self, category: EventCategory) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes_lowercase_categories() {
        let mut counts = BTreeMap::new();
        counts.insert(EventCategory::Read, 5);
        counts.insert(EventCategory::Error, 1);
        let snapshot = StatSnapshot {
            start: Utc::now(),
            duration_ms: 1000,
            counts,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["counts"]["read"], 5);
        assert_eq!(json["counts"]["error"], 1);
        assert_eq!(snapshot.count(EventCategory::Create), 0);
        assert_eq!(snapshot.total(), 6);
    }
}
