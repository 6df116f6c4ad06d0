//! Persistence layer for quire state
//!
//! Provides SQLite-backed storage for users, submissions, journal issues,
//! DOI sequence counters, and the activity log.

mod repository;
mod schema;

pub use repository::Repository;
pub use schema::{Schema, SCHEMA_VERSION};
