use axum::{debug_handler, extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session::USER_ID, AppResult, AppState};

use super::AuthConfig;

#[derive(Deserialize)]
pub(crate) struct LoginBody {
    email: String,
    full_name: String,
}

/// Thin identity resolution: the surrounding deployment fronts this
/// with its real IdP, here we only pin the session to a user row,
/// creating it on first login.
#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    State(auth): State<AuthConfig>,
    session: Session,
    Json(LoginBody { email, full_name }): Json<LoginBody>,
) -> AppResult<Response> {
    let email = email.trim().to_lowercase();

    let Some((_, domain)) = email.split_once('@') else {
        return Ok(bad_login("that doesn't look like an email address"));
    };
    if let Some(allowed) = &auth.allowed_email_domain {
        if !domain.eq_ignore_ascii_case(allowed) {
            return Ok(bad_login("signup is restricted to campus addresses"));
        }
    }

    let user_id = match super::find_by_email(&db_pool, &email).await? {
        Some(id) => id,
        None => super::create_user(&db_pool, &email, full_name.trim()).await?,
    };

    session.insert(USER_ID, user_id.to_string()).await?;
    tracing::info!(%user_id, "logged in");

    Ok(Json(json!({ "user_id": user_id })).into_response())
}

fn bad_login(message: &str) -> Response {
    (StatusCode::FORBIDDEN, Json(json!({ "message": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth, db};

    #[tokio::test]
    async fn first_login_creates_the_user_once() {
        let pool = db::test_pool().await;
        assert!(auth::find_by_email(&pool, "a@campus.edu").await.unwrap().is_none());

        let id = auth::create_user(&pool, "a@campus.edu", "Asha").await.unwrap();
        assert_eq!(auth::find_by_email(&pool, "a@campus.edu").await.unwrap(), Some(id));

        // email is unique, a second insert must fail
        assert!(auth::create_user(&pool, "a@campus.edu", "Asha").await.is_err());
    }
}
