use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::reveal::RevealGate;
use crate::OpError;

pub const MAX_HINT_CHARS: usize = 200;

/// What a recipient is allowed to see. There is deliberately no sender
/// field on this type: anonymity is enforced by the shape of the read
/// query, not by call sites remembering to omit a column.
#[derive(Debug, Serialize)]
pub struct Hint {
    pub hint_text: String,
    pub created_at: String,
}

/// Delivers an anonymous hint. The sender must hold an active
/// selection on the recipient, and sending closes with the reveal.
/// Sender identity is written to the row for abuse audits only.
pub async fn send(
    pool: &SqlitePool,
    reveal: &RevealGate,
    sender: Uuid,
    recipient: Uuid,
    text: &str,
) -> Result<(), OpError> {
    if reveal.is_revealed() {
        return Err(OpError::RevealClosed);
    }

    let text = text.trim();
    if text.chars().count() > MAX_HINT_CHARS {
        return Err(OpError::HintTooLong);
    }

    if sqlx::query_as::<_, ()>("SELECT 1 FROM likes WHERE chooser_id=? AND chosen_id=?")
        .bind(sender.to_string())
        .bind(recipient.to_string())
        .fetch_optional(pool)
        .await?
        .is_none()
    {
        return Err(OpError::NotSelected);
    }

    sqlx::query("INSERT INTO hints (id,sender_id,recipient_id,hint_text) VALUES (?,?,?,?)")
        .bind(Uuid::now_v7().to_string())
        .bind(sender.to_string())
        .bind(recipient.to_string())
        .bind(text)
        .execute(pool)
        .await?;

    Ok(())
}

/// Hints addressed to `recipient`, newest first. Restartable: calling
/// again picks up anything sent since.
pub async fn list_for_recipient(pool: &SqlitePool, recipient: Uuid) -> Result<Vec<Hint>, OpError> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT hint_text,created_at FROM hints WHERE recipient_id=? ORDER BY rowid DESC",
    )
    .bind(recipient.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(hint_text, created_at)| Hint { hint_text, created_at })
        .collect())
}

/// O(1) "you have N admirers" aggregate, separate from fetching text.
pub async fn count_for_recipient(pool: &SqlitePool, recipient: Uuid) -> Result<i64, OpError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hints WHERE recipient_id=?")
        .bind(recipient.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count)
}
