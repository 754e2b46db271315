use axum::{debug_handler, extract::State, response::{IntoResponse, Response}, Json};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::reveal::RevealGate;
use crate::{session, AppResult};

use super::relay;

#[derive(Deserialize)]
pub(crate) struct SendHintBody {
    target_id: Uuid,
    message: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn send_hint(
    State(db_pool): State<SqlitePool>,
    State(reveal): State<RevealGate>,
    session: Session,
    Json(SendHintBody { target_id, message }): Json<SendHintBody>,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    Ok(
        match relay::send(&db_pool, &reveal, user_id, target_id, &message).await {
            Ok(()) => {
                // recipient id stays out of the log line on purpose
                tracing::info!(%user_id, "hint delivered");
                Json(json!({ "ok": true })).into_response()
            }
            Err(e) => e.into_response(),
        },
    )
}
