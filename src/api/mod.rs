//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/timer",
            post(create_timer_handler)
                .get(get_timer_handler)
                .delete(discard_timer_handler),
        )
        .route("/timer/start", post(start_timer_handler))
        .route("/timer/pause", post(pause_timer_handler))
        .route("/timer/reset", post(reset_timer_handler))
        .route("/auth/sign-up", post(sign_up_handler))
        .route("/auth/sign-in", post(sign_in_handler))
        .route("/auth/sign-out", post(sign_out_handler))
        .route("/profile", get(profile_handler).patch(update_profile_handler))
        .route("/coaches", get(coaches_handler))
        .route("/sessions", post(create_session_handler).get(list_sessions_handler))
        .route("/sessions/live", get(live_sessions_handler))
        .route("/sessions/mine", get(coach_sessions_handler))
        .route("/sessions/:session_id/book", post(book_session_handler))
        .route("/runs", post(log_run_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
