use axum::{debug_handler, extract::State, response::{IntoResponse, Response}, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, AppResult};

use super::store;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_admirers(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    Ok(match store::admirer_summary(&db_pool, user_id).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => e.into_response(),
    })
}
