use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request body; carries the current FEN when one is known.
    #[error("{reason}")]
    BadRequest { reason: String, fen: Option<String> },

    /// The submitted move was rejected; the position is unchanged and the
    /// returned FEN lets the client resync.
    #[error("{reason}")]
    IllegalMove { reason: String, fen: String },

    /// The move-selection service failed after the human move was already
    /// applied. The returned FEN reflects the applied human move.
    #[error("{reason}")]
    Upstream { reason: String, fen: String },

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, fen) = match self {
            AppError::BadRequest { reason, fen } => (StatusCode::BAD_REQUEST, reason, fen),
            AppError::IllegalMove { reason, fen } => (StatusCode::BAD_REQUEST, reason, Some(fen)),
            AppError::Upstream { reason, fen } => {
                tracing::warn!("Upstream move service error: {reason}");
                (StatusCode::BAD_GATEWAY, reason, Some(fen))
            }
            AppError::Anyhow(e) => {
                tracing::error!("Unexpected error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({ "error": message });
        if let Some(fen) = fen {
            body["fen"] = json!(fen);
        }
        (status, Json(body)).into_response()
    }
}
