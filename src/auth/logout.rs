use axum::{debug_handler, response::{IntoResponse, Response}, Json};
use serde_json::json;
use tower_sessions::Session;

use crate::AppResult;

#[debug_handler]
pub(crate) async fn logout(session: Session) -> AppResult<Response> {
    session.clear().await;
    Ok(Json(json!({ "ok": true })).into_response())
}
