pub mod health;
pub mod reset_page;

use axum::{routing::get, Router};

use crate::state::AppState;

/// `/api/health` and `/api/db-status`.
pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/db-status", get(health::db_status))
}

pub fn page_routes() -> Router<AppState> {
    Router::new().route("/reset-password", get(reset_page::reset_page))
}
