use axum::{debug_handler, extract::State, Json};
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Time gate for match disclosure. Two states, Hidden then Revealed,
/// crossed exactly once at `deadline` with no trigger: `is_revealed`
/// is recomputed from the clock on every read, never cached.
#[derive(Clone)]
pub struct RevealGate {
    deadline: OffsetDateTime,
    deadline_text: String,
}

#[derive(Serialize)]
pub struct RevealStatus {
    pub deadline: String,
    pub is_revealed: bool,
}

impl RevealGate {
    pub fn new(deadline: OffsetDateTime) -> anyhow::Result<Self> {
        Ok(RevealGate {
            deadline,
            deadline_text: deadline.format(&Rfc3339)?,
        })
    }

    pub fn parse(deadline: &str) -> anyhow::Result<Self> {
        Self::new(OffsetDateTime::parse(deadline, &Rfc3339)?)
    }

    pub fn is_revealed(&self) -> bool {
        self.is_revealed_at(OffsetDateTime::now_utc())
    }

    pub fn is_revealed_at(&self, now: OffsetDateTime) -> bool {
        now >= self.deadline
    }

    pub fn status(&self) -> RevealStatus {
        self.status_at(OffsetDateTime::now_utc())
    }

    pub fn status_at(&self, now: OffsetDateTime) -> RevealStatus {
        RevealStatus {
            deadline: self.deadline_text.clone(),
            is_revealed: self.is_revealed_at(now),
        }
    }
}

// Polled every second by countdown timers, so this must stay a cheap
// read with no side effects.
#[debug_handler(state = crate::AppState)]
pub async fn status(State(reveal): State<RevealGate>) -> Json<RevealStatus> {
    Json(reveal.status())
}
