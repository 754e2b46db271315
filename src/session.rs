use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use tower_sessions::Session;
use uuid::Uuid;

use crate::AppResult;

pub const USER_ID: &str = "user_id";

/// The caller's identity, resolved fresh from the session on every
/// operation. `None` means not logged in.
pub async fn current_user(session: &Session) -> AppResult<Option<Uuid>> {
    let Some(raw) = session.get::<String>(USER_ID).await? else {
        return Ok(None);
    };
    Ok(Some(Uuid::parse_str(&raw)?))
}

pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "log in first" })),
    )
        .into_response()
}
