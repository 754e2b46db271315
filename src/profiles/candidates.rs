use axum::{debug_handler, extract::State, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{session, AppResult};

#[derive(Serialize)]
struct Candidate {
    id: Uuid,
    full_name: Option<String>,
    department: Option<String>,
    year: Option<String>,
}

/// Everyone the caller could select: all users but themselves, by
/// name. When both sides declare a gender, only the complementary
/// gender is listed; undeclared candidates always show. Presentation
/// filter only, the store never enforces it.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn candidates(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    let my_gender: Option<(Option<String>,)> =
        sqlx::query_as("SELECT gender FROM users WHERE id=?")
            .bind(user_id.to_string())
            .fetch_optional(&db_pool)
            .await?;
    let my_gender = my_gender.and_then(|(g,)| g).filter(|g| !g.is_empty());

    type Row = (String, Option<String>, Option<String>, Option<String>, Option<String>);
    let rows: Vec<Row> = sqlx::query_as(
        "SELECT id,full_name,department,year,gender FROM users WHERE id<>? ORDER BY full_name",
    )
    .bind(user_id.to_string())
    .fetch_all(&db_pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for (id, full_name, department, year, gender) in rows {
        if let (Some(mine), Some(theirs)) = (&my_gender, &gender) {
            if !theirs.is_empty() && mine.eq_ignore_ascii_case(theirs) {
                continue;
            }
        }
        out.push(Candidate {
            id: Uuid::parse_str(&id)?,
            full_name,
            department,
            year,
        });
    }

    Ok(Json(out).into_response())
}
