//! Activity log entries
//!
//! Immutable audit records of status changes. Append-only; nothing in the
//! core ever mutates or deletes an entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::submission::{SubmissionId, SubmissionStatus};

/// Unique identifier for an activity log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub Uuid);

impl ActivityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable audit record of a submission status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Unique entry ID
    pub id: ActivityId,
    /// Submission this entry belongs to
    pub submission_id: SubmissionId,
    /// Action tag
    pub action: String,
    /// Status before the change
    pub from_status: SubmissionStatus,
    /// Status after the change
    pub to_status: SubmissionStatus,
    /// User ID of the actor that triggered the change
    pub actor_id: String,
    /// When the change happened
    pub timestamp: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Build the audit record for a status change
    pub fn status_change(
        submission_id: SubmissionId,
        from: SubmissionStatus,
        to: SubmissionStatus,
        actor_id: String,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            submission_id,
            action: "status_change".to_string(),
            from_status: from,
            to_status: to,
            actor_id,
            timestamp: Utc::now(),
        }
    }

    /// Get a human-readable description of the entry
    pub fn description(&self) -> String {
        format!(
            "{} -> {} by {}",
            self.from_status, self.to_status, self.actor_id
        )
    }
}
