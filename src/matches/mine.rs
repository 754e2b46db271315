use axum::{debug_handler, extract::State, response::{IntoResponse, Response}, Json};
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::reveal::RevealGate;
use crate::{session, AppResult};

/// Re-evaluates the reveal gate on every call. The deadline can elapse
/// mid-session, so a flag cached at page load would go stale.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_matches(
    State(db_pool): State<SqlitePool>,
    State(reveal): State<RevealGate>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    let status = reveal.status();
    if !status.is_revealed {
        // matches may exist in storage; nothing about them leaks early
        return Ok(Json(json!({
            "revealed": false,
            "deadline": status.deadline,
            "matches": [],
        }))
        .into_response());
    }

    Ok(match super::partner_profiles(&db_pool, user_id).await {
        Ok(profiles) => Json(json!({
            "revealed": true,
            "deadline": status.deadline,
            "matches": profiles,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    })
}
