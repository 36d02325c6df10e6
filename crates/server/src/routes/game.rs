//! The move-submission/validation/state-sync cycle for the single game.

use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::selector::MoveQuery;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct FenResponse {
    pub fen: String,
}

#[derive(Serialize)]
pub struct StateResponse {
    pub fen: String,
    pub pgn: String,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
    pub model_id: Option<String>,
}

#[derive(Serialize)]
pub struct MoveResponse {
    pub fen: String,
    pub pgn: String,
    pub status_text: String,
    pub game_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_thoughts: Option<String>,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /get_fen — read-only snapshot of the authoritative position.
pub async fn get_fen(Extension(state): Extension<SharedState>) -> Json<StateResponse> {
    let game = state.game.lock().await;
    Json(StateResponse {
        fen: game.fen(),
        pgn: game.movetext(),
    })
}

/// GET /reset — back to the standard starting position, history cleared.
pub async fn reset(Extension(state): Extension<SharedState>) -> Json<FenResponse> {
    let mut game = state.game.lock().await;
    game.reset();
    tracing::info!("Board reset");
    Json(FenResponse { fen: game.fen() })
}

/// POST /move — apply the human move, then obtain and apply the AI reply.
///
/// The game lock is held across the selector call: submissions against the
/// one global game are strictly serialized.
pub async fn submit_move(
    Extension(state): Extension<SharedState>,
    input: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<MoveResponse>, AppError> {
    let mut game = state.game.lock().await;

    // A body that does not deserialize still gets the JSON error shape,
    // with the current FEN as a resync point.
    let Json(input) = input.map_err(|e| AppError::BadRequest {
        reason: format!("Invalid move data format: {e}"),
        fen: Some(game.fen()),
    })?;

    let user_move = game
        .submit(&input.from, &input.to, input.promotion.as_deref())
        .map_err(|e| AppError::IllegalMove {
            reason: e.to_string(),
            fen: game.fen(),
        })?;
    tracing::info!("User move {} ({}) applied", user_move.uci, user_move.san);

    // The human move may have ended the game; the AI turn is then skipped.
    if game.is_game_over() {
        return Ok(Json(MoveResponse {
            fen: game.fen(),
            pgn: game.movetext(),
            status_text: format!("Move {} successful. {}", user_move.san, game.status_text()),
            game_over: true,
            llm_thoughts: None,
        }));
    }

    let legal = game.legal_moves_uci();
    let query = MoveQuery {
        fen: game.fen(),
        history_uci: game.history_uci(),
        legal_moves_uci: legal.clone(),
        model_id: input
            .model_id
            .unwrap_or_else(|| state.default_model.clone()),
    };

    let choice = state
        .selector
        .select_move(&query)
        .await
        .map_err(|e| AppError::Upstream {
            reason: e.to_string(),
            fen: game.fen(),
        })?;

    let (ai_move, fallback_note) = if legal.contains(&choice.uci) {
        let mv = game
            .apply_uci(&choice.uci)
            .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e)))?;
        (mv, None)
    } else {
        // `legal` is non-empty here: the game was not over after the human
        // move. First entry of the sorted list keeps the choice stable.
        tracing::warn!(
            "Model reply {:?} is not in the legal set; falling back to {}",
            choice.uci,
            legal[0]
        );
        let mv = game
            .apply_uci(&legal[0])
            .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e)))?;
        let note = format!(
            "[Model reply '{}' was not legal; played {} instead.]",
            choice.uci, mv.san
        );
        (mv, Some(note))
    };

    let status_text = match &fallback_note {
        Some(note) => format!("You played {}. {} {}", user_move.san, note, game.status_text()),
        None => format!(
            "You played {}. Computer played {}. {}",
            user_move.san,
            ai_move.san,
            game.status_text()
        ),
    };

    tracing::info!("AI move {} applied; {}", ai_move.uci, game.fen());

    Ok(Json(MoveResponse {
        fen: game.fen(),
        pgn: game.movetext(),
        status_text,
        game_over: game.is_game_over(),
        llm_thoughts: choice.reasoning,
    }))
}
