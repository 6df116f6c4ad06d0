//! Quire Core - journal publication backend domain library
//!
//! This crate provides the core functionality for the quire journal
//! backend:
//!
//! - **Submission**: manuscript lifecycle with a status machine
//!   (Draft→Submitted→UnderReview→Published/Rejected), a role-gated
//!   transition authority, and the status-update operation
//! - **Issue**: lazy (volume, issue, year) grouping records with
//!   per-calendar-year sequential numbering
//! - **Identifier**: DOI slug assignment from per-year counters and
//!   collision-probed SEO article slugs
//! - **Activity**: append-only audit log of status changes
//! - **Notify**: best-effort SMTP status notifications behind a trait
//! - **Persistence**: SQLite-based storage for users, submissions,
//!   issues, counters, and the activity log
//! - **Config**: journal identity, server, and SMTP configuration
//!
//! # Transition flow
//!
//! ```text
//! existence check → authorization → numbering → identifiers
//!     → persist (one transaction) → audit → notify (best effort)
//! ```

pub mod activity;
pub mod config;
pub mod error;
pub mod identifier;
pub mod issue;
pub mod notify;
pub mod persistence;
pub mod submission;
pub mod user;

pub use activity::{ActivityId, ActivityLogEntry};
pub use config::{JournalConfig, QuireConfig, ServerConfig, SmtpConfig};
pub use error::{NotificationError, PersistenceError, QuireError, Result};
pub use issue::{IssueId, IssueSlot, JournalIssue};
pub use notify::{Notifier, NullNotifier, SmtpNotifier, StatusNotification};
pub use persistence::Repository;
pub use submission::{
    authorize_transition, Actor, Capability, Submission, SubmissionId, SubmissionStatus,
    UpdateStatus,
};
pub use user::User;
