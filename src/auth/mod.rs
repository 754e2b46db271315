mod login;
mod logout;

use axum::{routing::{get, post}, Router};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login::login))
        .route("/logout", get(logout::logout))
}

/// Signup policy: which email-domain suffix may log in. Configuration,
/// not part of the matching contract.
#[derive(Clone)]
pub struct AuthConfig {
    pub allowed_email_domain: Option<String>,
}

pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    full_name: &str,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO users (id,email,full_name) VALUES (?,?,?)")
        .bind(id.to_string())
        .bind(email)
        .bind(full_name)
        .execute(pool)
        .await?;
    tracing::info!(%id, "new user");
    Ok(id)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email=?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    match row {
        Some((id,)) => Ok(Some(
            Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(e.into()))?,
        )),
        None => Ok(None),
    }
}
