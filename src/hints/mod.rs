pub mod relay;

mod list;
mod send;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hints", get(list::my_hints))
        .route("/hints/count", get(list::my_hint_count))
        .route("/hint", post(send::send_hint))
}
