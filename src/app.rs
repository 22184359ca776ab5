use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/api/top", get(handlers::get_top))
        .route("/api/restaurants/:id/report", get(handlers::get_report))
        .with_state(state)
}
