use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/config", get(handlers::get_default_config))
        .route("/slots", post(handlers::list_all_slots))
        .route("/slots/available", post(handlers::list_available_slots))
        .route("/next", post(handlers::get_next_available_slot))
        .route("/validate", post(handlers::validate_slot))
        .with_state(state)
}
