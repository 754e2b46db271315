use axum::{debug_handler, extract::State, response::{IntoResponse, Response}, Json};
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, AppResult};

use super::relay;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_hints(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    Ok(match relay::list_for_recipient(&db_pool, user_id).await {
        Ok(hints) => Json(hints).into_response(),
        Err(e) => e.into_response(),
    })
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_hint_count(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    Ok(match relay::count_for_recipient(&db_pool, user_id).await {
        Ok(count) => Json(json!({ "count": count })).into_response(),
        Err(e) => e.into_response(),
    })
}
