//! HTTP endpoint handlers
//!
//! Every response uses the `{ success, message, data }` envelope; error
//! status codes follow the taxonomy (404 not found, 403 authorization,
//! 400 validation, 500 everything else).

use std::sync::{Arc, MutexGuard};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use quire_core::{
    Repository, Submission, SubmissionId, SubmissionStatus, QuireError, UpdateStatus,
};

use crate::auth::AuthActor;
use crate::AppState;

type HandlerResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Wire representation of a submission
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: Vec<String>,
    pub status: String,
    pub submitted_at: Option<String>,
    pub review_started_at: Option<String>,
    pub published_at: Option<String>,
    pub rejected_at: Option<String>,
    pub volume: Option<u32>,
    pub issue_number: Option<u32>,
    pub issue_id: Option<String>,
    pub doi_slug: Option<String>,
    pub article_slug: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Submission> for SubmissionResponse {
    fn from(s: &Submission) -> Self {
        Self {
            id: s.id.to_string(),
            owner_id: s.owner_id.clone(),
            title: s.title.clone(),
            abstract_text: s.abstract_text.clone(),
            keywords: s.keywords.clone(),
            status: s.status.to_string(),
            submitted_at: s.submitted_at.map(|t| t.to_rfc3339()),
            review_started_at: s.review_started_at.map(|t| t.to_rfc3339()),
            published_at: s.published_at.map(|t| t.to_rfc3339()),
            rejected_at: s.rejected_at.map(|t| t.to_rfc3339()),
            volume: s.volume,
            issue_number: s.issue_number,
            issue_id: s.issue_id.map(|id| id.to_string()),
            doi_slug: s.doi_slug.clone(),
            article_slug: s.article_slug.clone(),
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

fn envelope(message: impl Into<String>, data: Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message.into(),
        "data": data
    }))
}

fn error_response(err: QuireError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        QuireError::NotFound(_) => StatusCode::NOT_FOUND,
        QuireError::Authorization(_) => StatusCode::FORBIDDEN,
        QuireError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(json!({ "success": false, "message": err.to_string() })),
    )
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": message.into() })),
    )
}

fn lock_repository(state: &AppState) -> Result<MutexGuard<'_, Repository>, (StatusCode, Json<Value>)> {
    state.repository.lock().map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "repository lock poisoned" })),
        )
    })
}

fn parse_submission_id(id: &str) -> Result<SubmissionId, (StatusCode, Json<Value>)> {
    SubmissionId::parse(id).ok_or_else(|| bad_request(format!("Invalid submission id: {}", id)))
}

// ============================================================================
// Submission Endpoints
// ============================================================================

/// Request to create a draft submission
#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Create a new draft submission owned by the authenticated actor
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    AuthActor(actor): AuthActor,
    Json(request): Json<CreateSubmissionRequest>,
) -> HandlerResult {
    if request.title.trim().is_empty() {
        return Err(bad_request("title must not be empty"));
    }

    let submission = Submission::new(
        actor.id,
        request.title,
        request.abstract_text,
        request.keywords,
    );

    let repo = lock_repository(&state)?;
    repo.save_submission(&submission).map_err(error_response)?;

    Ok(envelope(
        "Submission created",
        json!(SubmissionResponse::from(&submission)),
    ))
}

/// Query parameters for listing submissions
#[derive(Debug, Deserialize)]
pub struct ListSubmissionsQuery {
    pub status: Option<String>,
}

/// List submissions, optionally filtered by status
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSubmissionsQuery>,
) -> HandlerResult {
    let repo = lock_repository(&state)?;

    let submissions = match query.status.as_deref() {
        Some(raw) => {
            let status = SubmissionStatus::parse(raw)
                .ok_or_else(|| bad_request(format!("Invalid status: {}", raw)))?;
            repo.get_submissions_by_status(status).map_err(error_response)?
        }
        None => repo.get_all_submissions().map_err(error_response)?,
    };

    let responses: Vec<SubmissionResponse> =
        submissions.iter().map(SubmissionResponse::from).collect();

    Ok(envelope(
        "Submissions retrieved",
        json!({ "submissions": responses, "count": responses.len() }),
    ))
}

/// Get a specific submission
pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult {
    let submission_id = parse_submission_id(&id)?;

    let repo = lock_repository(&state)?;
    let submission = repo
        .get_submission(&submission_id)
        .map_err(error_response)?
        .ok_or_else(|| error_response(QuireError::NotFound(format!("Submission not found: {}", id))))?;

    Ok(envelope(
        "Submission retrieved",
        json!(SubmissionResponse::from(&submission)),
    ))
}

/// Request to change a submission's status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Update a submission's status.
///
/// The core operation of the backend: role-gated transition, numbering
/// and identifier assignment on first publication, audit log append, and
/// best-effort owner notification.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AuthActor(actor): AuthActor,
    Json(request): Json<UpdateStatusRequest>,
) -> HandlerResult {
    let submission_id = parse_submission_id(&id)?;
    let target = SubmissionStatus::parse(&request.status)
        .ok_or_else(|| bad_request(format!("Invalid status: {}", request.status)))?;

    let command = UpdateStatus {
        submission_id,
        target,
        actor,
    };

    // The SMTP send can be slow, so the repository lock is released
    // before the notification is dispatched.
    let (submission, notification) = {
        let repo = lock_repository(&state)?;
        command
            .apply(&repo, &state.config.journal)
            .map_err(error_response)?
    };

    if let Some(notification) = notification {
        let notifier = state.notifier.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = notifier.status_changed(&notification) {
                tracing::warn!(
                    submission_id = %notification.submission_id,
                    "failed to send status notification: {}",
                    e
                );
            }
        });
    }

    Ok(envelope(
        format!("Submission status updated to {}", target),
        json!(SubmissionResponse::from(&submission)),
    ))
}

/// Get the activity log for a submission
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult {
    let submission_id = parse_submission_id(&id)?;

    let repo = lock_repository(&state)?;
    if repo
        .get_submission(&submission_id)
        .map_err(error_response)?
        .is_none()
    {
        return Err(error_response(QuireError::NotFound(format!(
            "Submission not found: {}",
            id
        ))));
    }

    let entries: Vec<Value> = repo
        .get_activity(&submission_id)
        .map_err(error_response)?
        .iter()
        .map(|e| {
            json!({
                "id": e.id.to_string(),
                "action": e.action,
                "from_status": e.from_status.to_string(),
                "to_status": e.to_status.to_string(),
                "actor_id": e.actor_id,
                "timestamp": e.timestamp.to_rfc3339(),
            })
        })
        .collect();

    Ok(envelope(
        "Activity retrieved",
        json!({ "submission_id": id, "entries": entries, "count": entries.len() }),
    ))
}

// ============================================================================
// Issue Endpoints
// ============================================================================

/// List journal issues with their publication counts
pub async fn list_issues(State(state): State<Arc<AppState>>) -> HandlerResult {
    let repo = lock_repository(&state)?;

    let issues: Vec<Value> = repo
        .list_issues()
        .map_err(error_response)?
        .iter()
        .map(|(issue, publications)| {
            json!({
                "id": issue.id.to_string(),
                "volume": issue.volume,
                "issue": issue.issue,
                "year": issue.year,
                "created_at": issue.created_at.to_rfc3339(),
                "publications": publications,
            })
        })
        .collect();

    Ok(envelope(
        "Issues retrieved",
        json!({ "issues": issues, "count": issues.len() }),
    ))
}

// ============================================================================
// System Endpoints
// ============================================================================

/// Get system status
pub async fn get_status(State(state): State<Arc<AppState>>) -> HandlerResult {
    let repo = lock_repository(&state)?;

    let counts = repo.status_counts().map_err(error_response)?;
    let issues = repo.list_issues().map_err(error_response)?;

    let by_status: Value = counts
        .iter()
        .map(|(status, count)| (status.clone(), json!(count)))
        .collect::<serde_json::Map<String, Value>>()
        .into();

    Ok(envelope(
        "Status retrieved",
        json!({
            "journal": state.config.journal.name,
            "submissions": by_status,
            "issues": issues.len(),
        }),
    ))
}
