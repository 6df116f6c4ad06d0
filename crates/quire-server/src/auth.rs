//! Authentication and authorization
//!
//! Bearer tokens are resolved against the users table; the extractor
//! hands the transition authority an `Actor` carrying the user's id and
//! role. Token issuance flows (registration, verification) live outside
//! this server.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    Json,
};
use serde_json::json;

use quire_core::Actor;

use crate::AppState;

/// Extractor for the authenticated actor behind a bearer token
pub struct AuthActor(pub Actor);

impl FromRequestParts<Arc<AppState>> for AuthActor {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);

        let Some(token) = token else {
            return Err(unauthorized("missing bearer token"));
        };

        let user = {
            let repo = state
                .repository
                .lock()
                .map_err(|_| server_error("repository lock poisoned"))?;
            repo.get_user_by_token(&token)
                .map_err(|e| server_error(&e.to_string()))?
        };

        match user {
            Some(user) => Ok(AuthActor(Actor::new(user.id, user.role))),
            None => Err(unauthorized("invalid bearer token")),
        }
    }
}

fn unauthorized(message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": message })),
    )
}

fn server_error(message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "message": message })),
    )
}

/// Generate a new user token
pub fn generate_user_token(user_id: &str) -> String {
    use uuid::Uuid;
    format!("quire-{}-{}", user_id, Uuid::new_v4())
}

/// Validate a user token format
pub fn validate_token_format(token: &str) -> bool {
    token.starts_with("quire-") && token.len() > 40
}
