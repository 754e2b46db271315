use std::time::Duration;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

// users:   id, email, full_name, department, year, gender, instagram_handle
//          unique: id
//          unique: email
// likes:   chooser_id -> chosen_id, the directed "I like this person" edge
//          unique: chooser_id, chosen_id
// matches: materialized from likes, canonical order user_lo < user_hi
//          unique: user_lo, user_hi
// hints:   sender_id kept for abuse audits, never readable by the recipient
//          unique: id
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    full_name TEXT,
    department TEXT,
    year TEXT,
    gender TEXT,
    instagram_handle TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
);

CREATE TABLE IF NOT EXISTS likes (
    chooser_id TEXT NOT NULL,
    chosen_id TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    UNIQUE (chooser_id, chosen_id)
);
CREATE INDEX IF NOT EXISTS likes_chosen ON likes (chosen_id);

CREATE TABLE IF NOT EXISTS matches (
    user_lo TEXT NOT NULL,
    user_hi TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    UNIQUE (user_lo, user_hi)
);

CREATE TABLE IF NOT EXISTS hints (
    id TEXT PRIMARY KEY,
    sender_id TEXT NOT NULL,
    recipient_id TEXT NOT NULL,
    hint_text TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
);
CREATE INDEX IF NOT EXISTS hints_recipient ON hints (recipient_id);
"#;

/// Opens (creating if missing) the database at `filename` and makes sure
/// the schema exists. WAL plus a busy timeout keeps concurrent writers
/// queueing instead of failing outright.
pub async fn open(filename: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(filename)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await?;

    init(&pool).await?;
    Ok(pool)
}

pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let path = std::env::temp_dir().join(format!("paperhearts-test-{}.db", uuid::Uuid::now_v7()));
    open(path.to_str().unwrap()).await.unwrap()
}
