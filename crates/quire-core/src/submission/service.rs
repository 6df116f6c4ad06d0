//! The status-update operation
//!
//! One request-scoped command composes the whole transition: existence
//! check, authorization, numbering and identifier assignment on first
//! publication, persistence, audit, and best-effort notification, in that
//! order.

use chrono::{Datelike, Utc};

use crate::activity::ActivityLogEntry;
use crate::config::JournalConfig;
use crate::error::{QuireError, Result};
use crate::identifier;
use crate::issue;
use crate::notify::{Notifier, StatusNotification};
use crate::persistence::Repository;

use super::authority::{authorize_transition, Actor};
use super::status::SubmissionStatus;
use super::submission::{Submission, SubmissionId};

/// Request to change a submission's status
#[derive(Debug, Clone)]
pub struct UpdateStatus {
    pub submission_id: SubmissionId,
    pub target: SubmissionStatus,
    pub actor: Actor,
}

impl UpdateStatus {
    /// Execute the transition and send the owner notification.
    ///
    /// Requesting the submission's current status is accepted
    /// idempotently and re-stamps the corresponding timestamp; numbering
    /// and identifiers are assigned only on the first transition into
    /// `Published` and never touched again.
    pub fn execute(
        &self,
        repo: &Repository,
        config: &JournalConfig,
        notifier: &dyn Notifier,
    ) -> Result<Submission> {
        let (submission, notification) = self.apply(repo, config)?;

        if let Some(notification) = notification {
            // Best effort. The status change is already durable, so a
            // failed notification channel never fails the request.
            if let Err(e) = notifier.status_changed(&notification) {
                tracing::warn!(
                    submission_id = %submission.id,
                    "failed to send status notification: {}",
                    e
                );
            }
        }

        Ok(submission)
    }

    /// Apply the transition and return the owner notification payload
    /// instead of sending it.
    ///
    /// Callers that hold a repository lock use this to dispatch the
    /// (potentially slow) notification after releasing the lock.
    pub fn apply(
        &self,
        repo: &Repository,
        config: &JournalConfig,
    ) -> Result<(Submission, Option<StatusNotification>)> {
        let mut submission = repo.get_submission(&self.submission_id)?.ok_or_else(|| {
            QuireError::NotFound(format!("Submission not found: {}", self.submission_id))
        })?;

        authorize_transition(&self.actor, &submission, self.target)?;

        let from = submission.status;
        let now = Utc::now();
        submission.status = self.target;
        submission.updated_at = now;

        match self.target {
            SubmissionStatus::Draft => {}
            SubmissionStatus::Submitted => submission.submitted_at = Some(now),
            SubmissionStatus::UnderReview => submission.review_started_at = Some(now),
            SubmissionStatus::Published => submission.published_at = Some(now),
            SubmissionStatus::Rejected => submission.rejected_at = Some(now),
        }

        if self.target == SubmissionStatus::Published && !submission.has_publication_identity() {
            // Numbering, counter increment, issue creation, and the
            // submission update commit atomically; a collision rolls
            // everything back.
            repo.transaction(|repo| {
                let year = now.year();

                let latest = repo.latest_issue()?;
                let slot = issue::next_slot(latest.as_ref(), year);
                let journal_issue = repo.get_or_create_issue(slot.volume, slot.issue, year)?;

                let sequence = repo.next_doi_sequence(year)?;
                let doi =
                    identifier::doi_slug(&config.doi_prefix, &config.journal_code, year, sequence);
                if repo.doi_slug_exists(&doi)? {
                    return Err(QuireError::Collision(format!(
                        "DOI slug already assigned: {}",
                        doi
                    )));
                }

                let base = identifier::article_slug_base(&doi, &submission.title);
                let article_slug =
                    identifier::unique_article_slug(&base, |candidate| {
                        repo.article_slug_exists(candidate)
                    })?;

                submission.volume = Some(slot.volume);
                submission.issue_number = Some(slot.issue);
                submission.issue_id = Some(journal_issue.id);
                submission.doi_slug = Some(doi);
                submission.article_slug = Some(article_slug);

                repo.save_submission(&submission)
            })?;
        } else {
            repo.save_submission(&submission)?;
        }

        // The audit trail is a compliance record; failure here is a hard
        // error even though the status change has already committed.
        let entry = ActivityLogEntry::status_change(
            submission.id,
            from,
            self.target,
            self.actor.id.clone(),
        );
        repo.append_activity(&entry)?;

        tracing::info!(
            submission_id = %submission.id,
            from = %from,
            to = %self.target,
            actor = %self.actor.id,
            "submission status updated"
        );

        let notification = self.owner_notification(repo, config, &submission);

        Ok((submission, notification))
    }

    /// Build the owner notification payload. A missing owner or a lookup
    /// failure is logged and drops the notification, never the request.
    fn owner_notification(
        &self,
        repo: &Repository,
        config: &JournalConfig,
        submission: &Submission,
    ) -> Option<StatusNotification> {
        let owner = match repo.get_user(&submission.owner_id) {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                tracing::warn!(
                    submission_id = %submission.id,
                    owner_id = %submission.owner_id,
                    "submission owner not found, skipping notification"
                );
                return None;
            }
            Err(e) => {
                tracing::warn!("failed to load submission owner: {}", e);
                return None;
            }
        };

        let link = match &submission.article_slug {
            Some(slug) => format!("{}/articles/{}", config.public_base_url, slug),
            None => format!("{}/submissions/{}", config.public_base_url, submission.id),
        };

        Some(StatusNotification {
            to_email: owner.email,
            status: submission.status,
            title: submission.title.clone(),
            submission_id: submission.id.to_string(),
            link,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::NotificationError;
    use crate::user::User;

    struct RecordingNotifier {
        sent: Mutex<Vec<StatusNotification>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn status_changed(&self, notification: &StatusNotification) -> Result<()> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn status_changed(&self, _notification: &StatusNotification) -> Result<()> {
            Err(NotificationError::Smtp("connection refused".to_string()).into())
        }
    }

    struct Fixture {
        repo: Repository,
        config: JournalConfig,
        author: User,
        editor: User,
    }

    fn fixture() -> Fixture {
        let repo = Repository::in_memory().unwrap();
        let author = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "author".to_string(),
        );
        let editor = User::new(
            "Ed".to_string(),
            "ed@example.com".to_string(),
            "editor".to_string(),
        );
        repo.save_user(&author).unwrap();
        repo.save_user(&editor).unwrap();
        Fixture {
            repo,
            config: JournalConfig::default(),
            author,
            editor,
        }
    }

    fn draft(fx: &Fixture, title: &str) -> Submission {
        let submission = Submission::new(
            fx.author.id.clone(),
            title.to_string(),
            "An abstract".to_string(),
            vec!["keyword".to_string()],
        );
        fx.repo.save_submission(&submission).unwrap();
        submission
    }

    fn actor(user: &User) -> Actor {
        Actor::new(user.id.clone(), user.role.clone())
    }

    fn update(id: SubmissionId, target: SubmissionStatus, by: &User) -> UpdateStatus {
        UpdateStatus {
            submission_id: id,
            target,
            actor: actor(by),
        }
    }

    #[test]
    fn test_missing_submission_is_not_found() {
        let fx = fixture();
        let cmd = update(SubmissionId::new(), SubmissionStatus::Submitted, &fx.author);
        let err = cmd
            .execute(&fx.repo, &fx.config, &RecordingNotifier::new())
            .unwrap_err();
        assert!(matches!(err, QuireError::NotFound(_)));
    }

    #[test]
    fn test_author_submits_own_draft() {
        let fx = fixture();
        let submission = draft(&fx, "Paper");
        let notifier = RecordingNotifier::new();

        let cmd = update(submission.id, SubmissionStatus::Submitted, &fx.author);
        let updated = cmd.execute(&fx.repo, &fx.config, &notifier).unwrap();

        assert_eq!(updated.status, SubmissionStatus::Submitted);
        assert!(updated.submitted_at.is_some());

        let log = fx.repo.get_activity(&submission.id).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].from_status, SubmissionStatus::Draft);
        assert_eq!(log[0].to_status, SubmissionStatus::Submitted);
        assert_eq!(log[0].actor_id, fx.author.id);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_email, "ada@example.com");
        assert_eq!(sent[0].status, SubmissionStatus::Submitted);
    }

    #[test]
    fn test_author_cannot_publish_and_state_is_unchanged() {
        let fx = fixture();
        let submission = draft(&fx, "Paper");

        let cmd = update(submission.id, SubmissionStatus::Published, &fx.author);
        let err = cmd
            .execute(&fx.repo, &fx.config, &RecordingNotifier::new())
            .unwrap_err();
        assert!(matches!(err, QuireError::Validation(_)));

        let stored = fx.repo.get_submission(&submission.id).unwrap().unwrap();
        assert_eq!(stored.status, SubmissionStatus::Draft);
        assert!(fx.repo.get_activity(&submission.id).unwrap().is_empty());
    }

    #[test]
    fn test_author_cannot_touch_foreign_submission() {
        let fx = fixture();
        let other = User::new(
            "Eve".to_string(),
            "eve@example.com".to_string(),
            "author".to_string(),
        );
        fx.repo.save_user(&other).unwrap();
        let submission = draft(&fx, "Paper");

        let cmd = update(submission.id, SubmissionStatus::Submitted, &other);
        let err = cmd
            .execute(&fx.repo, &fx.config, &RecordingNotifier::new())
            .unwrap_err();
        assert!(matches!(err, QuireError::Authorization(_)));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let fx = fixture();
        let outsider = User::new(
            "Sub".to_string(),
            "sub@example.com".to_string(),
            "subscriber".to_string(),
        );
        fx.repo.save_user(&outsider).unwrap();
        let submission = draft(&fx, "Paper");

        let cmd = update(submission.id, SubmissionStatus::Draft, &outsider);
        let err = cmd
            .execute(&fx.repo, &fx.config, &RecordingNotifier::new())
            .unwrap_err();
        assert!(matches!(err, QuireError::Authorization(_)));
    }

    #[test]
    fn test_first_publication_assigns_numbering_and_identifiers() {
        let fx = fixture();
        let submission = draft(&fx, "AI in Healthcare");
        let year = Utc::now().year();

        let cmd = update(submission.id, SubmissionStatus::Published, &fx.editor);
        let published = cmd
            .execute(&fx.repo, &fx.config, &RecordingNotifier::new())
            .unwrap();

        assert_eq!(published.status, SubmissionStatus::Published);
        assert!(published.published_at.is_some());
        assert_eq!(published.volume, Some(1));
        assert_eq!(published.issue_number, Some(1));
        assert_eq!(
            published.doi_slug.as_deref(),
            Some(format!("10.9999/jaepd.{}.1", year).as_str())
        );
        let expected_slug_prefix = format!("10-9999-jaepd-{}-1-ai-in-healthcare", year);
        assert!(published
            .article_slug
            .as_deref()
            .unwrap()
            .starts_with(&expected_slug_prefix));

        // The issue row was created lazily
        let latest = fx.repo.latest_issue().unwrap().unwrap();
        assert_eq!((latest.volume, latest.issue, latest.year), (1, 1, year));
        assert_eq!(published.issue_id, Some(latest.id));
    }

    #[test]
    fn test_second_publication_same_year_gets_next_slot_and_sequence() {
        let fx = fixture();
        let first = draft(&fx, "First Paper");
        let second = draft(&fx, "Second Paper");
        let year = Utc::now().year();
        let notifier = RecordingNotifier::new();

        update(first.id, SubmissionStatus::Published, &fx.editor)
            .execute(&fx.repo, &fx.config, &notifier)
            .unwrap();
        let published = update(second.id, SubmissionStatus::Published, &fx.editor)
            .execute(&fx.repo, &fx.config, &notifier)
            .unwrap();

        assert_eq!(published.volume, Some(1));
        assert_eq!(published.issue_number, Some(2));
        assert_eq!(
            published.doi_slug.as_deref(),
            Some(format!("10.9999/jaepd.{}.2", year).as_str())
        );
    }

    #[test]
    fn test_new_year_bumps_volume() {
        let fx = fixture();
        let year = Utc::now().year();
        // Latest issue is from last year
        fx.repo.get_or_create_issue(3, 2, year - 1).unwrap();
        let submission = draft(&fx, "Fresh Year Paper");

        let published = update(submission.id, SubmissionStatus::Published, &fx.editor)
            .execute(&fx.repo, &fx.config, &RecordingNotifier::new())
            .unwrap();

        assert_eq!(published.volume, Some(4));
        assert_eq!(published.issue_number, Some(1));
    }

    #[test]
    fn test_republish_is_idempotent_on_identifiers() {
        let fx = fixture();
        let submission = draft(&fx, "Paper");
        let notifier = RecordingNotifier::new();

        let first = update(submission.id, SubmissionStatus::Published, &fx.editor)
            .execute(&fx.repo, &fx.config, &notifier)
            .unwrap();
        let second = update(submission.id, SubmissionStatus::Published, &fx.editor)
            .execute(&fx.repo, &fx.config, &notifier)
            .unwrap();

        assert_eq!(second.status, SubmissionStatus::Published);
        assert_eq!(second.volume, first.volume);
        assert_eq!(second.issue_number, first.issue_number);
        assert_eq!(second.doi_slug, first.doi_slug);
        assert_eq!(second.article_slug, first.article_slug);
        assert!(second.published_at.unwrap() >= first.published_at.unwrap());

        // No extra issue row or sequence value was consumed
        let issues = fx.repo.list_issues().unwrap();
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_identifiers_survive_later_transitions() {
        let fx = fixture();
        let submission = draft(&fx, "Paper");
        let notifier = RecordingNotifier::new();

        let published = update(submission.id, SubmissionStatus::Published, &fx.editor)
            .execute(&fx.repo, &fx.config, &notifier)
            .unwrap();
        let reopened = update(submission.id, SubmissionStatus::UnderReview, &fx.editor)
            .execute(&fx.repo, &fx.config, &notifier)
            .unwrap();

        assert_eq!(reopened.status, SubmissionStatus::UnderReview);
        assert_eq!(reopened.doi_slug, published.doi_slug);
        assert_eq!(reopened.volume, published.volume);
        assert_eq!(reopened.issue_number, published.issue_number);
        assert_eq!(reopened.article_slug, published.article_slug);
    }

    #[test]
    fn test_duplicate_titles_get_distinct_article_slugs() {
        let fx = fixture();
        let first = draft(&fx, "Same Title");
        let second = draft(&fx, "Same Title");
        let notifier = RecordingNotifier::new();

        let a = update(first.id, SubmissionStatus::Published, &fx.editor)
            .execute(&fx.repo, &fx.config, &notifier)
            .unwrap();
        let b = update(second.id, SubmissionStatus::Published, &fx.editor)
            .execute(&fx.repo, &fx.config, &notifier)
            .unwrap();

        assert_ne!(a.doi_slug, b.doi_slug);
        assert_ne!(a.article_slug, b.article_slug);
    }

    #[test]
    fn test_preexisting_doi_surfaces_collision_and_rolls_back() {
        let fx = fixture();
        let year = Utc::now().year();

        // Occupy the DOI the counter will produce for sequence 1
        let mut occupier = draft(&fx, "Occupier");
        occupier.doi_slug = Some(format!("10.9999/jaepd.{}.1", year));
        fx.repo.save_submission(&occupier).unwrap();

        let submission = draft(&fx, "Victim Paper");
        let err = update(submission.id, SubmissionStatus::Published, &fx.editor)
            .execute(&fx.repo, &fx.config, &RecordingNotifier::new())
            .unwrap_err();
        assert!(matches!(err, QuireError::Collision(_)));

        // The whole publish rolled back: no numbering, no identifiers,
        // no lazily created issue row
        let stored = fx.repo.get_submission(&submission.id).unwrap().unwrap();
        assert!(stored.doi_slug.is_none());
        assert!(stored.article_slug.is_none());
        assert!(stored.volume.is_none());
        assert!(stored.issue_number.is_none());
        assert!(fx.repo.latest_issue().unwrap().is_none());
    }

    #[test]
    fn test_apply_returns_notification_without_sending() {
        let fx = fixture();
        let submission = draft(&fx, "Paper");

        let (updated, notification) = update(submission.id, SubmissionStatus::Submitted, &fx.author)
            .apply(&fx.repo, &fx.config)
            .unwrap();

        assert_eq!(updated.status, SubmissionStatus::Submitted);
        let notification = notification.unwrap();
        assert_eq!(notification.to_email, "ada@example.com");
        assert_eq!(notification.status, SubmissionStatus::Submitted);
        assert!(notification.link.contains(&submission.id.to_string()));
    }

    #[test]
    fn test_email_failure_does_not_fail_the_publish() {
        let fx = fixture();
        let submission = draft(&fx, "Paper");

        let published = update(submission.id, SubmissionStatus::Published, &fx.editor)
            .execute(&fx.repo, &fx.config, &FailingNotifier)
            .unwrap();

        assert_eq!(published.status, SubmissionStatus::Published);
        let stored = fx.repo.get_submission(&submission.id).unwrap().unwrap();
        assert_eq!(stored.status, SubmissionStatus::Published);
        assert!(stored.doi_slug.is_some());
        // The audit record still landed
        assert_eq!(fx.repo.get_activity(&submission.id).unwrap().len(), 1);
    }

    #[test]
    fn test_rejection_stamps_timestamp() {
        let fx = fixture();
        let submission = draft(&fx, "Paper");

        let rejected = update(submission.id, SubmissionStatus::Rejected, &fx.editor)
            .execute(&fx.repo, &fx.config, &RecordingNotifier::new())
            .unwrap();

        assert_eq!(rejected.status, SubmissionStatus::Rejected);
        assert!(rejected.rejected_at.is_some());
        assert!(rejected.doi_slug.is_none());
        assert!(rejected.volume.is_none());
    }
}
