mod mine;

use axum::{routing::get, Router};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppState, OpError};

pub fn router() -> Router<AppState> {
    Router::new().route("/matches", get(mine::my_matches))
}

/// Profile fields disclosed to a match partner, post-reveal only.
#[derive(Debug, Serialize)]
pub struct MatchProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub instagram_handle: Option<String>,
}

/// The other half of every match row `user` appears in.
pub async fn partners_of(pool: &SqlitePool, user: Uuid) -> Result<Vec<Uuid>, OpError> {
    let id = user.to_string();
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT user_lo,user_hi FROM matches WHERE user_lo=? OR user_hi=?")
            .bind(&id)
            .bind(&id)
            .fetch_all(pool)
            .await?;

    let mut partners = Vec::with_capacity(rows.len());
    for (lo, hi) in rows {
        let other = if lo == id { hi } else { lo };
        partners
            .push(Uuid::parse_str(&other).map_err(|e| OpError::Db(sqlx::Error::Decode(e.into())))?);
    }
    Ok(partners)
}

/// Full partner profiles for `user`'s matches. Callers must gate this
/// behind the reveal; nothing here checks the clock.
pub async fn partner_profiles(pool: &SqlitePool, user: Uuid) -> Result<Vec<MatchProfile>, OpError> {
    let mut profiles = Vec::new();
    for partner in partners_of(pool, user).await? {
        let row: Option<(Option<String>, Option<String>, Option<String>, Option<String>)> =
            sqlx::query_as(
                "SELECT full_name,department,year,instagram_handle FROM users WHERE id=?",
            )
            .bind(partner.to_string())
            .fetch_optional(pool)
            .await?;

        if let Some((full_name, department, year, instagram_handle)) = row {
            profiles.push(MatchProfile {
                id: partner,
                full_name,
                department,
                year,
                instagram_handle,
            });
        }
    }
    Ok(profiles)
}
