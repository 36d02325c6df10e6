//! Capability interface for the external move-selection service.

use async_trait::async_trait;

/// Everything a selector needs to pick a move for the side to move.
#[derive(Debug, Clone)]
pub struct MoveQuery {
    pub fen: String,
    pub history_uci: Vec<String>,
    /// Sorted UCI strings; never empty when a selection is requested.
    pub legal_moves_uci: Vec<String>,
    pub model_id: String,
}

/// The selector's answer. `uci` is not guaranteed to be legal — the game
/// service validates it and falls back deterministically if it is not.
#[derive(Debug, Clone)]
pub struct MoveChoice {
    pub uci: String,
    pub reasoning: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error("Move selector is not configured (missing API key)")]
    NotConfigured,

    #[error("Move service request failed: {0}")]
    Http(String),

    #[error("Move service returned a malformed reply: {0}")]
    MalformedReply(String),
}

#[async_trait]
pub trait MoveSelector: Send + Sync {
    async fn select_move(&self, query: &MoveQuery) -> Result<MoveChoice, SelectorError>;
}
