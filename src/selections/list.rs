use axum::{debug_handler, extract::State, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{session, AppResult};

use super::store;

#[derive(Serialize)]
struct SelectionRow {
    selected_user_id: Uuid,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_selections(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    Ok(match store::list_selections(&db_pool, user_id).await {
        Ok(chosen) => Json(
            chosen
                .into_iter()
                .map(|selected_user_id| SelectionRow { selected_user_id })
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => e.into_response(),
    })
}
