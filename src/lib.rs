pub mod auth;
pub mod db;
pub mod hints;
pub mod matches;
pub mod profiles;
pub mod reveal;
pub mod selections;
pub mod session;

use axum::{extract::FromRef, http::StatusCode, response::{IntoResponse, Response}, routing::get, Json, Router};
use serde_json::json;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

use auth::AuthConfig;
use reveal::RevealGate;
use selections::locks::UserLocks;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub locks: UserLocks,
    pub reveal: RevealGate,
    pub auth: AuthConfig,
}

/// The complete service: session layer, login routes and the `/api`
/// surface over one shared state.
pub fn app(app_state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(2)));

    Router::new()
        .merge(auth::router())
        .nest(
            "/api",
            Router::new()
                .route("/reveal", get(reveal::status))
                .merge(selections::router())
                .merge(matches::router())
                .merge(hints::router())
                .merge(profiles::router()),
        )
        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive())
}

pub type AppResult<T> = Result<T, AppError>;

/// Infrastructure failure. Anything that isn't a domain outcome
/// ([`OpError`]) ends up here and becomes a 500.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "something went wrong, try again" })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Domain outcome of a core operation: validation errors are 400s,
/// conflicts 409s, exhausted-retry transients 503s. Database errors
/// fall through to a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error("you can't select yourself")]
    SelfSelect,
    #[error("that user doesn't exist")]
    UnknownUser,
    #[error("you already selected this person")]
    AlreadySelected,
    #[error("you can only select up to {} people", selections::store::MAX_SELECTIONS)]
    CapExceeded,
    #[error("you haven't selected this person")]
    NotSelected,
    #[error("hints are limited to {} characters", hints::relay::MAX_HINT_CHARS)]
    HintTooLong,
    #[error("the reveal has already happened")]
    RevealClosed,
    #[error("busy right now, try again in a moment")]
    Busy,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl IntoResponse for OpError {
    fn into_response(self) -> Response {
        use OpError::*;
        let status = match &self {
            SelfSelect | CapExceeded | HintTooLong | RevealClosed => StatusCode::BAD_REQUEST,
            AlreadySelected | NotSelected | UnknownUser => StatusCode::CONFLICT,
            Busy => StatusCode::SERVICE_UNAVAILABLE,
            Db(e) => {
                tracing::error!("database error: {e}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "something went wrong, try again" })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
