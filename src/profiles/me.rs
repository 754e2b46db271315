use axum::{debug_handler, extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{session, AppResult};

use super::Profile;

pub(crate) async fn load(pool: &SqlitePool, id: Uuid) -> AppResult<Option<Profile>> {
    type Row = (String, Option<String>, Option<String>, Option<String>, Option<String>, Option<String>);
    let row: Option<Row> = sqlx::query_as(
        "SELECT email,full_name,department,year,gender,instagram_handle FROM users WHERE id=?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(
        |(email, full_name, department, year, gender, instagram_handle)| Profile {
            id,
            email,
            full_name,
            department,
            year,
            gender,
            instagram_handle,
        },
    ))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_profile(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    let Some(profile) = load(&db_pool, user_id).await? else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    Ok(Json(json!({
        "is_complete": profile.is_complete(),
        "missing_fields": profile.missing_fields(),
        "profile": profile,
    }))
    .into_response())
}

#[derive(Deserialize)]
pub(crate) struct ProfileForm {
    full_name: Option<String>,
    department: Option<String>,
    year: Option<String>,
    gender: Option<String>,
    instagram_handle: Option<String>,
}

/// Owner-only mutation; omitted fields keep their stored value.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn update_profile(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(form): Json<ProfileForm>,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok(session::unauthorized());
    };

    // handles arrive with or without the leading @
    let instagram_handle = form
        .instagram_handle
        .map(|h| h.trim().trim_start_matches('@').to_owned());

    sqlx::query(
        "UPDATE users SET
            full_name = COALESCE(?, full_name),
            department = COALESCE(?, department),
            year = COALESCE(?, year),
            gender = COALESCE(?, gender),
            instagram_handle = COALESCE(?, instagram_handle)
         WHERE id=?",
    )
    .bind(&form.full_name)
    .bind(&form.department)
    .bind(&form.year)
    .bind(&form.gender)
    .bind(&instagram_handle)
    .bind(user_id.to_string())
    .execute(&db_pool)
    .await?;

    let Some(profile) = load(&db_pool, user_id).await? else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    Ok(Json(json!({
        "is_complete": profile.is_complete(),
        "missing_fields": profile.missing_fields(),
        "profile": profile,
    }))
    .into_response())
}
