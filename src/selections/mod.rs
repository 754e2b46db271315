pub mod locks;
pub mod store;

mod admirers;
mod list;
mod select;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/selections", get(list::my_selections))
        .route("/admirers", get(admirers::my_admirers))
        .route("/select", post(select::select_user))
        .route("/deselect", post(select::deselect_user))
}
