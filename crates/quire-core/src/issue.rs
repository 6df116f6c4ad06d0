//! Journal issues and sequential numbering
//!
//! A `JournalIssue` groups published submissions under a
//! (volume, issue-number, year) triple. Issues are created lazily, the
//! first time a submission publishes into a not-yet-existing slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a journal issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueId(pub Uuid);

impl IssueId {
    /// Create a new random issue ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an ID from its string form
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for IssueId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A (volume, issue-number, year) grouping of published submissions.
///
/// At most one row exists per (volume, issue) pair; the database enforces
/// this with a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalIssue {
    pub id: IssueId,
    pub volume: u32,
    pub issue: u32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
}

impl JournalIssue {
    /// Create a new issue record for the given slot
    pub fn new(volume: u32, issue: u32, year: i32) -> Self {
        Self {
            id: IssueId::new(),
            volume,
            issue,
            year,
            created_at: Utc::now(),
        }
    }
}

/// A computed (volume, issue) slot for a publication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueSlot {
    pub volume: u32,
    pub issue: u32,
}

/// Compute the slot for the next publication.
///
/// Issue numbers increment within a volume per calendar year; the volume
/// increments and the issue resets to 1 when the year changes relative to
/// the latest existing issue.
pub fn next_slot(latest: Option<&JournalIssue>, current_year: i32) -> IssueSlot {
    match latest {
        None => IssueSlot { volume: 1, issue: 1 },
        Some(latest) if latest.year == current_year => IssueSlot {
            volume: latest.volume,
            issue: latest.issue + 1,
        },
        Some(latest) => IssueSlot {
            volume: latest.volume + 1,
            issue: 1,
        },
    }
}
