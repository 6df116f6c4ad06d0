//! Submission lifecycle
//!
//! A submission moves through the status machine (Draft → Submitted →
//! UnderReview → Published/Rejected) under a role-gated transition
//! authority; publication assigns issue numbering and identifiers.

mod authority;
mod service;
mod status;
mod submission;

pub use authority::{authorize_transition, Actor, Capability};
pub use service::UpdateStatus;
pub use status::SubmissionStatus;
pub use submission::{Submission, SubmissionId};
