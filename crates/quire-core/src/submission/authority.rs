//! Transition authorization policy
//!
//! The policy is a pure (capability, target-status) decision table plus an
//! ownership rule for authors, kept separate from the mutation logic so it
//! can be tested on its own.

use crate::error::{QuireError, Result};

use super::status::SubmissionStatus;
use super::submission::Submission;

/// The effective permission bucket derived from a user's role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Author,
    Editor,
    Reviewer,
    Admin,
}

impl Capability {
    /// Map a stored role string onto a capability, if recognized
    pub fn from_role(role: &str) -> Option<Capability> {
        match role.to_lowercase().as_str() {
            "author" => Some(Capability::Author),
            "editor" => Some(Capability::Editor),
            "reviewer" => Some(Capability::Reviewer),
            "admin" => Some(Capability::Admin),
            _ => None,
        }
    }

    /// The target statuses this capability may request.
    ///
    /// Authors may only move their own manuscript between draft and
    /// submitted; the editorial capabilities may set any status.
    pub fn allowed_targets(&self) -> &'static [SubmissionStatus] {
        match self {
            Capability::Author => &[SubmissionStatus::Draft, SubmissionStatus::Submitted],
            Capability::Editor | Capability::Reviewer | Capability::Admin => &SubmissionStatus::ALL,
        }
    }

    /// Check the decision table for a single (capability, target) cell
    pub fn may_target(&self, target: SubmissionStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Whether this capability is restricted to submissions it owns
    pub fn ownership_scoped(&self) -> bool {
        matches!(self, Capability::Author)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Author => write!(f, "author"),
            Capability::Editor => write!(f, "editor"),
            Capability::Reviewer => write!(f, "reviewer"),
            Capability::Admin => write!(f, "admin"),
        }
    }
}

/// The authenticated actor requesting a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// User ID
    pub id: String,
    /// Role string as stored on the user record
    pub role: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
        }
    }
}

/// Decide whether `actor` may move `submission` to `target`.
///
/// Evaluated before any mutation. Ownership violations and unrecognized
/// roles are authorization failures; an author requesting a target outside
/// its table row is a validation failure (surfaced as HTTP 400).
pub fn authorize_transition(
    actor: &Actor,
    submission: &Submission,
    target: SubmissionStatus,
) -> Result<Capability> {
    let capability = Capability::from_role(&actor.role)
        .ok_or_else(|| QuireError::Authorization("not authorized to change status".to_string()))?;

    if capability.ownership_scoped() && submission.owner_id != actor.id {
        return Err(QuireError::Authorization(
            "authors can only change their own submissions".to_string(),
        ));
    }

    if !capability.may_target(target) {
        return Err(QuireError::Validation(
            "authors can only set draft or submitted".to_string(),
        ));
    }

    Ok(capability)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission_owned_by(owner: &str) -> Submission {
        Submission::new(
            owner.to_string(),
            "Paper".to_string(),
            "Abstract".to_string(),
            vec![],
        )
    }

    #[test]
    fn test_author_allowed_targets() {
        let cap = Capability::Author;
        assert!(cap.may_target(SubmissionStatus::Draft));
        assert!(cap.may_target(SubmissionStatus::Submitted));
        assert!(!cap.may_target(SubmissionStatus::UnderReview));
        assert!(!cap.may_target(SubmissionStatus::Published));
        assert!(!cap.may_target(SubmissionStatus::Rejected));
    }

    #[test]
    fn test_editorial_capabilities_unrestricted() {
        for cap in [Capability::Editor, Capability::Reviewer, Capability::Admin] {
            for status in SubmissionStatus::ALL {
                assert!(cap.may_target(status), "{} should allow {}", cap, status);
            }
            assert!(!cap.ownership_scoped());
        }
    }

    #[test]
    fn test_author_owns_submission() {
        let submission = submission_owned_by("user-1");
        let actor = Actor::new("user-1", "author");
        assert!(authorize_transition(&actor, &submission, SubmissionStatus::Submitted).is_ok());
    }

    #[test]
    fn test_author_ownership_violation() {
        let submission = submission_owned_by("user-1");
        let actor = Actor::new("user-2", "author");
        let err = authorize_transition(&actor, &submission, SubmissionStatus::Submitted).unwrap_err();
        assert!(matches!(err, QuireError::Authorization(_)));
    }

    #[test]
    fn test_author_disallowed_target_is_validation() {
        let submission = submission_owned_by("user-1");
        let actor = Actor::new("user-1", "author");
        let err = authorize_transition(&actor, &submission, SubmissionStatus::Published).unwrap_err();
        assert!(matches!(err, QuireError::Validation(_)));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let submission = submission_owned_by("user-1");
        let actor = Actor::new("user-1", "subscriber");
        let err = authorize_transition(&actor, &submission, SubmissionStatus::Draft).unwrap_err();
        assert!(matches!(err, QuireError::Authorization(_)));
    }

    #[test]
    fn test_editor_ignores_ownership() {
        let submission = submission_owned_by("user-1");
        let actor = Actor::new("someone-else", "editor");
        assert!(authorize_transition(&actor, &submission, SubmissionStatus::Published).is_ok());
    }
}
