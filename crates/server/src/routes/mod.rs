pub mod game;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::state::SharedState;

/// API routes only; the static client and CORS are layered on in `main`.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(game::health))
        .route("/get_fen", get(game::get_fen))
        .route("/reset", get(game::reset))
        .route("/move", post(game::submit_move))
        .layer(Extension(state))
}
