//! Submission entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::issue::IssueId;

use super::status::SubmissionStatus;

/// Unique identifier for a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    /// Create a new random submission ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an ID from its string form
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A manuscript submission, the central entity of the journal backend.
///
/// Created in `Draft` by an author and mutated only through the
/// status-transition operation (or direct field edits while still in
/// draft). The publication fields (`volume`, `issue_number`, `doi_slug`,
/// `article_slug`) are populated exactly once, at the first transition
/// into `Published`, and are immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Unique submission ID
    pub id: SubmissionId,
    /// User ID of the submitting author
    pub owner_id: String,
    /// Manuscript title
    pub title: String,
    /// Manuscript abstract
    pub abstract_text: String,
    /// Keyword list
    pub keywords: Vec<String>,
    /// Current lifecycle status
    pub status: SubmissionStatus,
    /// Stamped on transition to `Submitted`
    pub submitted_at: Option<DateTime<Utc>>,
    /// Stamped on transition to `UnderReview`
    pub review_started_at: Option<DateTime<Utc>>,
    /// Stamped on transition to `Published`
    pub published_at: Option<DateTime<Utc>>,
    /// Stamped on transition to `Rejected`
    pub rejected_at: Option<DateTime<Utc>>,
    /// Assigned volume number (first publication only)
    pub volume: Option<u32>,
    /// Assigned issue number within the volume (first publication only)
    pub issue_number: Option<u32>,
    /// The journal issue this submission was published into
    pub issue_id: Option<IssueId>,
    /// DOI-like slug, globally unique
    pub doi_slug: Option<String>,
    /// SEO-friendly article slug, globally unique
    pub article_slug: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// Create a new draft submission owned by the given author
    pub fn new(owner_id: String, title: String, abstract_text: String, keywords: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SubmissionId::new(),
            owner_id,
            title,
            abstract_text,
            keywords,
            status: SubmissionStatus::Draft,
            submitted_at: None,
            review_started_at: None,
            published_at: None,
            rejected_at: None,
            volume: None,
            issue_number: None,
            issue_id: None,
            doi_slug: None,
            article_slug: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether publication numbering and identifiers have been assigned.
    ///
    /// Once true, volume/issue/DOI/article slug never change again, even
    /// across further (idempotent) publish transitions.
    pub fn has_publication_identity(&self) -> bool {
        self.doi_slug.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_submission_is_draft() {
        let s = Submission::new(
            "user-1".to_string(),
            "A Title".to_string(),
            "An abstract".to_string(),
            vec!["keyword".to_string()],
        );
        assert_eq!(s.status, SubmissionStatus::Draft);
        assert!(s.submitted_at.is_none());
        assert!(!s.has_publication_identity());
    }

    #[test]
    fn test_id_parse_roundtrip() {
        let id = SubmissionId::new();
        assert_eq!(SubmissionId::parse(&id.to_string()), Some(id));
        assert_eq!(SubmissionId::parse("not-a-uuid"), None);
    }
}
