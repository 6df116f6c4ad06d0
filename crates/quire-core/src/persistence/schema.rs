//! SQLite schema for quire state storage

/// Schema version for migrations
pub const SCHEMA_VERSION: u32 = 1;

/// SQLite schema definition
pub struct Schema;

impl Schema {
    /// Get the complete schema SQL
    pub fn create_tables() -> &'static str {
        r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    role TEXT NOT NULL,
    auth_token TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_token ON users(auth_token);
CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

-- Journal issues table ((volume, issue, year) grouping records)
CREATE TABLE IF NOT EXISTS journal_issues (
    id TEXT PRIMARY KEY,
    volume INTEGER NOT NULL,
    issue INTEGER NOT NULL,
    year INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_issues_slot ON journal_issues(volume, issue);
CREATE INDEX IF NOT EXISTS idx_issues_year ON journal_issues(year DESC, volume DESC, issue DESC);

-- Submissions table
CREATE TABLE IF NOT EXISTS submissions (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    "abstract" TEXT NOT NULL,
    keywords TEXT NOT NULL,
    status TEXT NOT NULL,
    submitted_at TEXT,
    review_started_at TEXT,
    published_at TEXT,
    rejected_at TEXT,
    volume INTEGER,
    issue_number INTEGER,
    issue_id TEXT,
    doi_slug TEXT,
    article_slug TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (owner_id) REFERENCES users(id),
    FOREIGN KEY (issue_id) REFERENCES journal_issues(id)
);

CREATE INDEX IF NOT EXISTS idx_submissions_status ON submissions(status);
CREATE INDEX IF NOT EXISTS idx_submissions_owner ON submissions(owner_id);
CREATE INDEX IF NOT EXISTS idx_submissions_issue ON submissions(issue_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_submissions_doi ON submissions(doi_slug);
CREATE UNIQUE INDEX IF NOT EXISTS idx_submissions_article_slug ON submissions(article_slug);

-- Per-year DOI sequence counters
CREATE TABLE IF NOT EXISTS doi_sequences (
    year INTEGER PRIMARY KEY,
    value INTEGER NOT NULL
);

-- Activity log (append-only audit trail)
CREATE TABLE IF NOT EXISTS activity_log (
    id TEXT PRIMARY KEY,
    submission_id TEXT NOT NULL,
    action TEXT NOT NULL,
    from_status TEXT NOT NULL,
    to_status TEXT NOT NULL,
    actor_id TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    FOREIGN KEY (submission_id) REFERENCES submissions(id)
);

CREATE INDEX IF NOT EXISTS idx_activity_submission ON activity_log(submission_id);
CREATE INDEX IF NOT EXISTS idx_activity_timestamp ON activity_log(timestamp);
"#
    }

    /// Get migration SQL for a specific version
    pub fn migration(from_version: u32, to_version: u32) -> Option<&'static str> {
        match (from_version, to_version) {
            // Add migrations here as the schema evolves
            _ => None,
        }
    }
}
