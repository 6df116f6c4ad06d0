//! Submission status machine
//!
//! Lifecycle:
//! ```text
//! Draft → Submitted → UnderReview → Published
//!                          ↓
//!                       Rejected
//! ```

use serde::{Deserialize, Serialize};

/// The publication status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// Manuscript is being prepared by the author
    Draft,
    /// Manuscript has been submitted for consideration
    Submitted,
    /// Manuscript is with the editorial team
    UnderReview,
    /// Manuscript has been published in an issue
    Published,
    /// Manuscript was rejected
    Rejected,
}

impl SubmissionStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [SubmissionStatus; 5] = [
        SubmissionStatus::Draft,
        SubmissionStatus::Submitted,
        SubmissionStatus::UnderReview,
        SubmissionStatus::Published,
        SubmissionStatus::Rejected,
    ];

    /// The forward lifecycle successors of this status
    pub fn forward_transitions(&self) -> Vec<SubmissionStatus> {
        match self {
            SubmissionStatus::Draft => vec![SubmissionStatus::Submitted],
            SubmissionStatus::Submitted => vec![SubmissionStatus::UnderReview],
            SubmissionStatus::UnderReview => {
                vec![SubmissionStatus::Published, SubmissionStatus::Rejected]
            }
            SubmissionStatus::Published => vec![],
            SubmissionStatus::Rejected => vec![],
        }
    }

    /// Check if the status is terminal (no further transitions modeled)
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Published | SubmissionStatus::Rejected)
    }

    /// Check if a submission in this status is visible to readers
    pub fn is_public(&self) -> bool {
        matches!(self, SubmissionStatus::Published)
    }

    /// Parse a wire/storage representation
    pub fn parse(s: &str) -> Option<SubmissionStatus> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(SubmissionStatus::Draft),
            "SUBMITTED" => Some(SubmissionStatus::Submitted),
            "UNDER_REVIEW" => Some(SubmissionStatus::UnderReview),
            "PUBLISHED" => Some(SubmissionStatus::Published),
            "REJECTED" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }

    /// Get a human-readable description of the status
    pub fn description(&self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "Being prepared by the author",
            SubmissionStatus::Submitted => "Submitted, awaiting editorial triage",
            SubmissionStatus::UnderReview => "Under editorial review",
            SubmissionStatus::Published => "Published",
            SubmissionStatus::Rejected => "Rejected",
        }
    }
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        SubmissionStatus::Draft
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Draft => write!(f, "DRAFT"),
            SubmissionStatus::Submitted => write!(f, "SUBMITTED"),
            SubmissionStatus::UnderReview => write!(f, "UNDER_REVIEW"),
            SubmissionStatus::Published => write!(f, "PUBLISHED"),
            SubmissionStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}
