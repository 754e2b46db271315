use axum::{debug_handler, extract::State, response::{IntoResponse, Response}, Json};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{session, AppResult};

use super::locks::UserLocks;
use super::store;

#[derive(Deserialize)]
pub(crate) struct TargetBody {
    target_id: Uuid,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn select_user(
    State(db_pool): State<SqlitePool>,
    State(locks): State<UserLocks>,
    session: Session,
    Json(TargetBody { target_id }): Json<TargetBody>,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    Ok(match store::select(&db_pool, &locks, user_id, target_id).await {
        Ok(outcome) => {
            tracing::info!(%user_id, %target_id, ?outcome, "selection recorded");
            // whether the pick was reciprocated stays hidden until the
            // reveal, so the caller learns nothing beyond "recorded"
            Json(json!({ "ok": true })).into_response()
        }
        Err(e) => e.into_response(),
    })
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn deselect_user(
    State(db_pool): State<SqlitePool>,
    State(locks): State<UserLocks>,
    session: Session,
    Json(TargetBody { target_id }): Json<TargetBody>,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    Ok(match store::deselect(&db_pool, &locks, user_id, target_id).await {
        Ok(()) => {
            tracing::info!(%user_id, %target_id, "selection removed");
            Json(json!({ "ok": true })).into_response()
        }
        Err(e) => e.into_response(),
    })
}
