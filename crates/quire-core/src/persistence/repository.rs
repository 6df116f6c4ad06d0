//! Repository for CRUD operations on quire entities

use std::path::Path;

use super::schema::{Schema, SCHEMA_VERSION};
use crate::activity::{ActivityId, ActivityLogEntry};
use crate::error::{PersistenceError, Result};
use crate::issue::{IssueId, JournalIssue};
use crate::submission::{Submission, SubmissionId, SubmissionStatus};
use crate::user::User;

/// Repository for persisting quire state
pub struct Repository {
    conn: rusqlite::Connection,
}

impl Repository {
    /// Create a new repository with the given database path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = rusqlite::Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Create an in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Initialize the database schema
    fn initialize(&self) -> Result<()> {
        let current_version = self.get_schema_version().unwrap_or(0);

        if current_version == 0 {
            self.conn.execute_batch(Schema::create_tables())?;
            self.set_schema_version(SCHEMA_VERSION)?;
        } else if current_version < SCHEMA_VERSION {
            for version in current_version..SCHEMA_VERSION {
                if let Some(migration) = Schema::migration(version, version + 1) {
                    self.conn.execute_batch(migration)?;
                }
            }
            self.set_schema_version(SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Option<u32> {
        self.conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY applied_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok()
    }

    fn set_schema_version(&self, version: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
        Ok(())
    }

    /// Run `f` inside a single SQLite transaction.
    ///
    /// The publish path uses this so numbering, counter increments, issue
    /// creation, and the submission update commit or roll back together;
    /// an error from `f` rolls everything back.
    pub fn transaction<T>(&self, f: impl FnOnce(&Repository) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    // ==================== User Operations ====================

    /// Save a user to the database
    pub fn save_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO users
            (id, name, email, role, auth_token, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            rusqlite::params![
                user.id,
                user.name,
                user.email,
                user.role,
                user.auth_token,
                user.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Get a user by ID
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, name, email, role, auth_token, created_at FROM users WHERE id = ?1",
            [id],
            Self::row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(PersistenceError::from(e).into()),
        }
    }

    /// Resolve a bearer token to its user
    pub fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, name, email, role, auth_token, created_at FROM users WHERE auth_token = ?1",
            [token],
            Self::row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(PersistenceError::from(e).into()),
        }
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        use chrono::DateTime;

        let created_at_str: String = row.get(5)?;

        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: row.get(3)?,
            auth_token: row.get(4)?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .unwrap()
                .with_timezone(&chrono::Utc),
        })
    }

    // ==================== Submission Operations ====================

    const SUBMISSION_COLUMNS: &'static str = r#"id, owner_id, title, "abstract", keywords, status,
        submitted_at, review_started_at, published_at, rejected_at,
        volume, issue_number, issue_id, doi_slug, article_slug, created_at, updated_at"#;

    /// Save a submission to the database
    pub fn save_submission(&self, submission: &Submission) -> Result<()> {
        let keywords_json = serde_json::to_string(&submission.keywords)?;

        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO submissions
            (id, owner_id, title, "abstract", keywords, status,
             submitted_at, review_started_at, published_at, rejected_at,
             volume, issue_number, issue_id, doi_slug, article_slug, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            rusqlite::params![
                submission.id.to_string(),
                submission.owner_id,
                submission.title,
                submission.abstract_text,
                keywords_json,
                submission.status.to_string(),
                submission.submitted_at.map(|t| t.to_rfc3339()),
                submission.review_started_at.map(|t| t.to_rfc3339()),
                submission.published_at.map(|t| t.to_rfc3339()),
                submission.rejected_at.map(|t| t.to_rfc3339()),
                submission.volume,
                submission.issue_number,
                submission.issue_id.map(|id| id.to_string()),
                submission.doi_slug,
                submission.article_slug,
                submission.created_at.to_rfc3339(),
                submission.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Get a submission by ID
    pub fn get_submission(&self, id: &SubmissionId) -> Result<Option<Submission>> {
        let sql = format!(
            "SELECT {} FROM submissions WHERE id = ?1",
            Self::SUBMISSION_COLUMNS
        );
        let result = self
            .conn
            .query_row(&sql, [id.to_string()], Self::row_to_submission);

        match result {
            Ok(submission) => Ok(Some(submission)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(PersistenceError::from(e).into()),
        }
    }

    /// Get all submissions, newest first
    pub fn get_all_submissions(&self) -> Result<Vec<Submission>> {
        let sql = format!(
            "SELECT {} FROM submissions ORDER BY created_at DESC",
            Self::SUBMISSION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let submissions = stmt
            .query_map([], Self::row_to_submission)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(submissions)
    }

    /// Get submissions by status
    pub fn get_submissions_by_status(&self, status: SubmissionStatus) -> Result<Vec<Submission>> {
        let sql = format!(
            "SELECT {} FROM submissions WHERE status = ?1 ORDER BY created_at DESC",
            Self::SUBMISSION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let submissions = stmt
            .query_map([status.to_string()], Self::row_to_submission)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(submissions)
    }

    /// Count submissions per status
    pub fn status_counts(&self) -> Result<Vec<(String, u64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM submissions GROUP BY status")?;

        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn row_to_submission(row: &rusqlite::Row) -> rusqlite::Result<Submission> {
        use chrono::DateTime;

        fn parse_ts(s: String) -> chrono::DateTime<chrono::Utc> {
            DateTime::parse_from_rfc3339(&s)
                .unwrap()
                .with_timezone(&chrono::Utc)
        }

        let id_str: String = row.get(0)?;
        let keywords_json: String = row.get(4)?;
        let status_str: String = row.get(5)?;
        let submitted_at: Option<String> = row.get(6)?;
        let review_started_at: Option<String> = row.get(7)?;
        let published_at: Option<String> = row.get(8)?;
        let rejected_at: Option<String> = row.get(9)?;
        let issue_id_str: Option<String> = row.get(12)?;
        let created_at_str: String = row.get(15)?;
        let updated_at_str: String = row.get(16)?;

        Ok(Submission {
            id: SubmissionId::parse(&id_str).unwrap(),
            owner_id: row.get(1)?,
            title: row.get(2)?,
            abstract_text: row.get(3)?,
            keywords: serde_json::from_str(&keywords_json).unwrap_or_default(),
            status: SubmissionStatus::parse(&status_str).unwrap_or_default(),
            submitted_at: submitted_at.map(parse_ts),
            review_started_at: review_started_at.map(parse_ts),
            published_at: published_at.map(parse_ts),
            rejected_at: rejected_at.map(parse_ts),
            volume: row.get(10)?,
            issue_number: row.get(11)?,
            issue_id: issue_id_str.and_then(|s| IssueId::parse(&s)),
            doi_slug: row.get(13)?,
            article_slug: row.get(14)?,
            created_at: parse_ts(created_at_str),
            updated_at: parse_ts(updated_at_str),
        })
    }

    // ==================== Issue Operations ====================

    /// Get the most recently numbered issue, ordered by
    /// (year desc, volume desc, issue desc)
    pub fn latest_issue(&self) -> Result<Option<JournalIssue>> {
        let result = self.conn.query_row(
            "SELECT id, volume, issue, year, created_at FROM journal_issues ORDER BY year DESC, volume DESC, issue DESC LIMIT 1",
            [],
            Self::row_to_issue,
        );

        match result {
            Ok(issue) => Ok(Some(issue)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(PersistenceError::from(e).into()),
        }
    }

    /// Get the issue row for a (volume, issue) slot, creating it if absent
    pub fn get_or_create_issue(&self, volume: u32, issue: u32, year: i32) -> Result<JournalIssue> {
        let existing = self.conn.query_row(
            "SELECT id, volume, issue, year, created_at FROM journal_issues WHERE volume = ?1 AND issue = ?2",
            rusqlite::params![volume, issue],
            Self::row_to_issue,
        );

        match existing {
            Ok(found) => Ok(found),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                let created = JournalIssue::new(volume, issue, year);
                self.conn.execute(
                    "INSERT INTO journal_issues (id, volume, issue, year, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        created.id.to_string(),
                        created.volume,
                        created.issue,
                        created.year,
                        created.created_at.to_rfc3339(),
                    ],
                )?;
                Ok(created)
            }
            Err(e) => Err(PersistenceError::from(e).into()),
        }
    }

    /// List all issues with their publication counts, newest first
    pub fn list_issues(&self) -> Result<Vec<(JournalIssue, u64)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT i.id, i.volume, i.issue, i.year, i.created_at,
                   (SELECT COUNT(*) FROM submissions s WHERE s.issue_id = i.id) AS publications
            FROM journal_issues i
            ORDER BY i.year DESC, i.volume DESC, i.issue DESC
            "#,
        )?;

        let issues = stmt
            .query_map([], |row| {
                let issue = Self::row_to_issue(row)?;
                let count: u64 = row.get(5)?;
                Ok((issue, count))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    fn row_to_issue(row: &rusqlite::Row) -> rusqlite::Result<JournalIssue> {
        use chrono::DateTime;

        let id_str: String = row.get(0)?;
        let created_at_str: String = row.get(4)?;

        Ok(JournalIssue {
            id: IssueId::parse(&id_str).unwrap(),
            volume: row.get(1)?,
            issue: row.get(2)?,
            year: row.get(3)?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .unwrap()
                .with_timezone(&chrono::Utc),
        })
    }

    // ==================== Identifier Operations ====================

    /// Atomically claim the next DOI sequence number for a year.
    ///
    /// Upserts into the per-year counter row so concurrent publish
    /// requests inside their transactions never observe the same value.
    pub fn next_doi_sequence(&self, year: i32) -> Result<u32> {
        let value = self.conn.query_row(
            "INSERT INTO doi_sequences (year, value) VALUES (?1, 1)
             ON CONFLICT(year) DO UPDATE SET value = value + 1
             RETURNING value",
            [year],
            |row| row.get(0),
        )?;
        Ok(value)
    }

    /// Check whether a DOI slug is already assigned
    pub fn doi_slug_exists(&self, slug: &str) -> Result<bool> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM submissions WHERE doi_slug = ?1",
            [slug],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Check whether an article slug is already assigned
    pub fn article_slug_exists(&self, slug: &str) -> Result<bool> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM submissions WHERE article_slug = ?1",
            [slug],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ==================== Activity Log Operations ====================

    /// Append an activity log entry. The log is append-only; no update or
    /// delete paths exist.
    pub fn append_activity(&self, entry: &ActivityLogEntry) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO activity_log
            (id, submission_id, action, from_status, to_status, actor_id, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            rusqlite::params![
                entry.id.to_string(),
                entry.submission_id.to_string(),
                entry.action,
                entry.from_status.to_string(),
                entry.to_status.to_string(),
                entry.actor_id,
                entry.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Get the activity log for a submission, oldest first
    pub fn get_activity(&self, submission_id: &SubmissionId) -> Result<Vec<ActivityLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, submission_id, action, from_status, to_status, actor_id, timestamp
             FROM activity_log WHERE submission_id = ?1 ORDER BY timestamp ASC",
        )?;

        let entries = stmt
            .query_map([submission_id.to_string()], Self::row_to_activity)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn row_to_activity(row: &rusqlite::Row) -> rusqlite::Result<ActivityLogEntry> {
        use chrono::DateTime;
        use uuid::Uuid;

        let id_str: String = row.get(0)?;
        let submission_id_str: String = row.get(1)?;
        let from_str: String = row.get(3)?;
        let to_str: String = row.get(4)?;
        let timestamp_str: String = row.get(6)?;

        Ok(ActivityLogEntry {
            id: ActivityId(Uuid::parse_str(&id_str).unwrap()),
            submission_id: SubmissionId::parse(&submission_id_str).unwrap(),
            action: row.get(2)?,
            from_status: SubmissionStatus::parse(&from_str).unwrap_or_default(),
            to_status: SubmissionStatus::parse(&to_str).unwrap_or_default(),
            actor_id: row.get(5)?,
            timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                .unwrap()
                .with_timezone(&chrono::Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save_owner(repo: &Repository, owner: &str) {
        let mut user = User::new(
            owner.to_string(),
            format!("{owner}@example.com"),
            "author".to_string(),
        );
        user.id = owner.to_string();
        repo.save_user(&user).unwrap();
    }

    fn sample_submission(owner: &str) -> Submission {
        Submission::new(
            owner.to_string(),
            "Test Paper".to_string(),
            "An abstract".to_string(),
            vec!["testing".to_string(), "rust".to_string()],
        )
    }

    #[test]
    fn test_repository_creation() {
        let repo = Repository::in_memory().unwrap();
        assert!(repo.get_all_submissions().unwrap().is_empty());
    }

    #[test]
    fn test_submission_crud() {
        let repo = Repository::in_memory().unwrap();

        save_owner(&repo, "user-1");
        let submission = sample_submission("user-1");
        let id = submission.id;

        repo.save_submission(&submission).unwrap();

        let loaded = repo.get_submission(&id).unwrap().unwrap();
        assert_eq!(loaded.title, "Test Paper");
        assert_eq!(loaded.status, SubmissionStatus::Draft);
        assert_eq!(loaded.keywords, vec!["testing", "rust"]);

        let all = repo.get_all_submissions().unwrap();
        assert_eq!(all.len(), 1);

        let drafts = repo.get_submissions_by_status(SubmissionStatus::Draft).unwrap();
        assert_eq!(drafts.len(), 1);
        let published = repo
            .get_submissions_by_status(SubmissionStatus::Published)
            .unwrap();
        assert!(published.is_empty());
    }

    #[test]
    fn test_user_crud_and_token_lookup() {
        let repo = Repository::in_memory().unwrap();

        let user = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "editor".to_string(),
        )
        .with_token("quire-test-token".to_string());

        repo.save_user(&user).unwrap();

        let by_id = repo.get_user(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");

        let by_token = repo.get_user_by_token("quire-test-token").unwrap().unwrap();
        assert_eq!(by_token.id, user.id);

        assert!(repo.get_user_by_token("wrong").unwrap().is_none());
    }

    #[test]
    fn test_latest_issue_ordering() {
        let repo = Repository::in_memory().unwrap();

        repo.get_or_create_issue(1, 1, 2024).unwrap();
        repo.get_or_create_issue(1, 2, 2024).unwrap();
        repo.get_or_create_issue(2, 1, 2025).unwrap();

        let latest = repo.latest_issue().unwrap().unwrap();
        assert_eq!((latest.volume, latest.issue, latest.year), (2, 1, 2025));
    }

    #[test]
    fn test_get_or_create_issue_is_idempotent() {
        let repo = Repository::in_memory().unwrap();

        let first = repo.get_or_create_issue(1, 1, 2025).unwrap();
        let second = repo.get_or_create_issue(1, 1, 2025).unwrap();
        assert_eq!(first.id, second.id);

        let issues = repo.list_issues().unwrap();
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_doi_sequence_counter() {
        let repo = Repository::in_memory().unwrap();

        assert_eq!(repo.next_doi_sequence(2025).unwrap(), 1);
        assert_eq!(repo.next_doi_sequence(2025).unwrap(), 2);
        assert_eq!(repo.next_doi_sequence(2025).unwrap(), 3);
        // Counters are scoped per year
        assert_eq!(repo.next_doi_sequence(2026).unwrap(), 1);
    }

    #[test]
    fn test_slug_existence_probes() {
        let repo = Repository::in_memory().unwrap();

        save_owner(&repo, "user-1");
        let mut submission = sample_submission("user-1");
        submission.doi_slug = Some("10.9999/jaepd.2025.1".to_string());
        submission.article_slug = Some("10-9999-jaepd-2025-1-test-paper".to_string());
        repo.save_submission(&submission).unwrap();

        assert!(repo.doi_slug_exists("10.9999/jaepd.2025.1").unwrap());
        assert!(!repo.doi_slug_exists("10.9999/jaepd.2025.2").unwrap());
        assert!(repo
            .article_slug_exists("10-9999-jaepd-2025-1-test-paper")
            .unwrap());
        assert!(!repo.article_slug_exists("free-slug").unwrap());
    }

    #[test]
    fn test_activity_append_and_read() {
        let repo = Repository::in_memory().unwrap();

        save_owner(&repo, "user-1");
        let submission = sample_submission("user-1");
        repo.save_submission(&submission).unwrap();

        let entry = ActivityLogEntry::status_change(
            submission.id,
            SubmissionStatus::Draft,
            SubmissionStatus::Submitted,
            "user-1".to_string(),
        );
        repo.append_activity(&entry).unwrap();

        let log = repo.get_activity(&submission.id).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].to_status, SubmissionStatus::Submitted);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let repo = Repository::in_memory().unwrap();

        let result: Result<()> = repo.transaction(|r| {
            r.get_or_create_issue(1, 1, 2025)?;
            Err(crate::error::QuireError::Collision("boom".to_string()))
        });
        assert!(result.is_err());
        assert!(repo.latest_issue().unwrap().is_none());
    }

    #[test]
    fn test_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quire.db");

        let id = {
            let repo = Repository::new(&path).unwrap();
            save_owner(&repo, "user-1");
            let submission = sample_submission("user-1");
            repo.save_submission(&submission).unwrap();
            submission.id
        };

        let repo = Repository::new(&path).unwrap();
        assert!(repo.get_submission(&id).unwrap().is_some());
    }
}
