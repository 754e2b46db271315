use std::time::Duration;

use rand::Rng;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::OpError;

use super::locks::UserLocks;

pub const MAX_SELECTIONS: i64 = 5;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// One-sided like recorded, no reciprocal yet.
    Selected,
    /// Reciprocal like already existed; the match was materialized.
    Matched,
}

/// Canonical match key. Every pair is stored exactly once, smaller id
/// first, and the UNIQUE constraint on this ordering is what makes two
/// near-simultaneous symmetric selects converge on a single match row.
fn canonical(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Records `chooser -> chosen` and, if the reciprocal like exists,
/// materializes the match in the same transaction. Holds both users'
/// advisory locks for the whole sequence; SQLite write conflicts are
/// retried a bounded number of times before surfacing as Busy.
pub async fn select(
    pool: &SqlitePool,
    locks: &UserLocks,
    chooser: Uuid,
    chosen: Uuid,
) -> Result<SelectOutcome, OpError> {
    if chooser == chosen {
        return Err(OpError::SelfSelect);
    }

    let _guard = locks.lock_pair(chooser, chosen).await;
    with_retries(|| select_once(pool, chooser, chosen)).await
}

/// Removes `chooser -> chosen`. If the pair was matched, the match row
/// is deleted in the same transaction; the counterpart's own like is
/// left alone.
pub async fn deselect(
    pool: &SqlitePool,
    locks: &UserLocks,
    chooser: Uuid,
    chosen: Uuid,
) -> Result<(), OpError> {
    // a self-selection can never exist, so chooser == chosen simply
    // finds no row and reports NotSelected
    let _guard = locks.lock_pair(chooser, chosen).await;
    with_retries(|| deselect_once(pool, chooser, chosen)).await
}

/// The chooser's active selections, in the order they were made.
pub async fn list_selections(pool: &SqlitePool, chooser: Uuid) -> Result<Vec<Uuid>, OpError> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT chosen_id FROM likes WHERE chooser_id=? ORDER BY rowid")
            .bind(chooser.to_string())
            .fetch_all(pool)
            .await?;

    let mut chosen = Vec::with_capacity(rows.len());
    for (id,) in rows {
        chosen.push(Uuid::parse_str(&id).map_err(|e| OpError::Db(sqlx::Error::Decode(e.into())))?);
    }
    Ok(chosen)
}

/// Anonymous "you have N admirers" teaser: how many people currently
/// hold a selection on `user`, plus the distinct departments they come
/// from. An aggregate over incoming likes, never their identities.
#[derive(Debug, serde::Serialize)]
pub struct AdmirerSummary {
    pub count: i64,
    pub departments: Vec<String>,
}

pub async fn admirer_summary(pool: &SqlitePool, user: Uuid) -> Result<AdmirerSummary, OpError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE chosen_id=?")
        .bind(user.to_string())
        .fetch_one(pool)
        .await?;

    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT u.department FROM likes l
         JOIN users u ON u.id = l.chooser_id
         WHERE l.chosen_id=? AND u.department IS NOT NULL AND u.department<>''
         ORDER BY u.department",
    )
    .bind(user.to_string())
    .fetch_all(pool)
    .await?;

    Ok(AdmirerSummary {
        count,
        departments: rows.into_iter().map(|(d,)| d).collect(),
    })
}

async fn select_once(
    pool: &SqlitePool,
    chooser: Uuid,
    chosen: Uuid,
) -> Result<SelectOutcome, OpError> {
    let mut tx = pool.begin().await?;

    if sqlx::query_as::<_, ()>("SELECT 1 FROM users WHERE id=?")
        .bind(chosen.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .is_none()
    {
        return Err(OpError::UnknownUser);
    }

    if sqlx::query_as::<_, ()>("SELECT 1 FROM likes WHERE chooser_id=? AND chosen_id=?")
        .bind(chooser.to_string())
        .bind(chosen.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .is_some()
    {
        return Err(OpError::AlreadySelected);
    }

    // cap re-checked inside the transaction, same atomic unit as the
    // insert, so concurrent selects by the same chooser can't overshoot
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE chooser_id=?")
        .bind(chooser.to_string())
        .fetch_one(&mut *tx)
        .await?;
    if count >= MAX_SELECTIONS {
        return Err(OpError::CapExceeded);
    }

    sqlx::query("INSERT INTO likes (chooser_id,chosen_id) VALUES (?,?)")
        .bind(chooser.to_string())
        .bind(chosen.to_string())
        .execute(&mut *tx)
        .await?;

    let reciprocal = sqlx::query_as::<_, ()>("SELECT 1 FROM likes WHERE chooser_id=? AND chosen_id=?")
        .bind(chosen.to_string())
        .bind(chooser.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .is_some();

    if reciprocal {
        let (lo, hi) = canonical(chooser, chosen);
        sqlx::query(
            "INSERT INTO matches (user_lo,user_hi) VALUES (?,?)
             ON CONFLICT (user_lo,user_hi) DO NOTHING",
        )
        .bind(lo.to_string())
        .bind(hi.to_string())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(if reciprocal {
        SelectOutcome::Matched
    } else {
        SelectOutcome::Selected
    })
}

async fn deselect_once(pool: &SqlitePool, chooser: Uuid, chosen: Uuid) -> Result<(), OpError> {
    let mut tx = pool.begin().await?;

    // match goes first so no committed state ever has a match without
    // both underlying likes
    let (lo, hi) = canonical(chooser, chosen);
    sqlx::query("DELETE FROM matches WHERE user_lo=? AND user_hi=?")
        .bind(lo.to_string())
        .bind(hi.to_string())
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM likes WHERE chooser_id=? AND chosen_id=?")
        .bind(chooser.to_string())
        .bind(chosen.to_string())
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        // dropping tx rolls back the match delete
        return Err(OpError::NotSelected);
    }

    tx.commit().await?;
    Ok(())
}

async fn with_retries<T, F, Fut>(mut op: F) -> Result<T, OpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OpError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(OpError::Db(e)) if is_transient(&e) => {
                attempt += 1;
                if attempt > MAX_RETRIES {
                    tracing::warn!("giving up after {MAX_RETRIES} retries: {e}");
                    return Err(OpError::Busy);
                }
                let jitter = rand::rng().random_range(0..10u64);
                tokio::time::sleep(Duration::from_millis(10 * attempt as u64 + jitter)).await;
            }
            other => return other,
        }
    }
}

fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.code().as_deref(), Some("5") | Some("6"))
                || db.message().contains("locked")
        }
        _ => false,
    }
}
