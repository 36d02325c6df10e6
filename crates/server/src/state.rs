use std::sync::Arc;

use chess_core::Game;
use tokio::sync::Mutex;

use crate::selector::MoveSelector;

/// Process-wide state: the single game and the configured move selector.
///
/// The mutex is held for the whole move-submission cycle, including the
/// selector call, so concurrent submissions against the one global game are
/// serialized rather than racing.
pub struct AppState {
    pub game: Mutex<Game>,
    pub selector: Arc<dyn MoveSelector>,
    pub default_model: String,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(selector: Arc<dyn MoveSelector>, default_model: String) -> SharedState {
        Arc::new(Self {
            game: Mutex::new(Game::new()),
            selector,
            default_model,
        })
    }
}
