//! Single-game state over shakmaty: move application, legality checks,
//! status derivation, and FEN/movetext serialization.

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position, Rank, Role, Square};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("Invalid move format: {0}")]
    InvalidFormat(String),

    #[error("Illegal move: {0}")]
    Illegal(String),

    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
}

/// A move that has been applied to the game, in both notations.
#[derive(Debug, Clone)]
pub struct RecordedMove {
    pub uci: String,
    pub san: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
    Check,
    Ongoing,
}

impl GameStatus {
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::Check | GameStatus::Ongoing)
    }
}

/// One chess game: the current position plus the moves that produced it.
///
/// The position is only ever mutated through [`Game::submit`] and
/// [`Game::apply_uci`], both of which validate against the legal-move set
/// before playing, so it is always a legal state reachable from the start.
#[derive(Debug, Clone)]
pub struct Game {
    pos: Chess,
    history: Vec<RecordedMove>,
    /// Repetition keys (FEN minus move counters) of every position seen,
    /// including the starting one.
    seen_keys: Vec<String>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        let pos = Chess::default();
        let key = repetition_key(&pos);
        Self {
            pos,
            history: Vec::new(),
            seen_keys: vec![key],
        }
    }

    /// Start from an arbitrary position. History begins empty.
    pub fn from_fen(fen: &str) -> Result<Self, MoveError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|_| MoveError::InvalidFen(fen.to_string()))?;
        let pos = parsed
            .into_position::<Chess>(CastlingMode::Standard)
            .map_err(|_| MoveError::InvalidFen(fen.to_string()))?;
        let key = repetition_key(&pos);
        Ok(Self {
            pos,
            history: Vec::new(),
            seen_keys: vec![key],
        })
    }

    pub fn reset(&mut self) {
        self.pos = Chess::default();
        self.history.clear();
        self.seen_keys = vec![repetition_key(&self.pos)];
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        self.pos.turn()
    }

    pub fn history(&self) -> &[RecordedMove] {
        &self.history
    }

    pub fn history_uci(&self) -> Vec<String> {
        self.history.iter().map(|m| m.uci.clone()).collect()
    }

    /// All legal moves as UCI strings, sorted lexicographically so that
    /// "first legal move" is a stable choice regardless of generation order.
    pub fn legal_moves_uci(&self) -> Vec<String> {
        let mut moves: Vec<String> = self
            .pos
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .collect();
        moves.sort();
        moves
    }

    /// Submit a move as square names plus an optional promotion letter.
    ///
    /// The promotion letter is only attached when the moved piece is a pawn
    /// reaching the final rank, so a stray `promotion` field on an ordinary
    /// move does not turn it into garbage UCI.
    pub fn submit(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Result<RecordedMove, MoveError> {
        let from_sq: Square = from
            .parse()
            .map_err(|_| MoveError::InvalidFormat(format!("{from}{to}")))?;
        let to_sq: Square = to
            .parse()
            .map_err(|_| MoveError::InvalidFormat(format!("{from}{to}")))?;

        let mut uci = format!("{from}{to}");
        if let Some(promo) = promotion {
            if self.is_promotion_square(from_sq, to_sq) {
                uci.push_str(&promo.to_lowercase());
            }
        }

        self.apply_uci(&uci)
    }

    /// Validate and play a move given in UCI notation.
    /// On any error the position is left untouched.
    pub fn apply_uci(&mut self, uci: &str) -> Result<RecordedMove, MoveError> {
        let parsed: UciMove = uci
            .parse()
            .map_err(|_| MoveError::InvalidFormat(uci.to_string()))?;
        let mv = parsed
            .to_move(&self.pos)
            .map_err(|_| MoveError::Illegal(uci.to_string()))?;

        let recorded = RecordedMove {
            uci: mv.to_uci(CastlingMode::Standard).to_string(),
            san: San::from_move(&self.pos, mv.clone()).to_string(),
        };
        self.pos.play_unchecked(mv);
        self.history.push(recorded.clone());
        self.seen_keys.push(repetition_key(&self.pos));
        Ok(recorded)
    }

    fn is_promotion_square(&self, from: Square, to: Square) -> bool {
        match self.pos.board().piece_at(from) {
            Some(piece) if piece.role == Role::Pawn => match piece.color {
                Color::White => to.rank() == Rank::Eighth,
                Color::Black => to.rank() == Rank::First,
            },
            _ => false,
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.pos.is_checkmate() {
            GameStatus::Checkmate {
                winner: self.pos.turn().other(),
            }
        } else if self.pos.is_stalemate() {
            GameStatus::Stalemate
        } else if self.pos.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else if self.pos.halfmoves() >= 150 {
            GameStatus::SeventyFiveMoves
        } else if self.current_repetitions() >= 5 {
            GameStatus::FivefoldRepetition
        } else if self.pos.is_check() {
            GameStatus::Check
        } else {
            GameStatus::Ongoing
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.status().is_game_over()
    }

    /// How often the current position has occurred, counting the moment it
    /// first arose.
    fn current_repetitions(&self) -> usize {
        match self.seen_keys.last() {
            Some(current) => self.seen_keys.iter().filter(|k| *k == current).count(),
            None => 0,
        }
    }

    pub fn status_text(&self) -> String {
        match self.status() {
            GameStatus::Checkmate { winner } => {
                format!("CHECKMATE! {} wins.", color_name(winner))
            }
            GameStatus::Stalemate => "STALEMATE! Draw.".to_string(),
            GameStatus::InsufficientMaterial => "DRAW! Insufficient material.".to_string(),
            GameStatus::SeventyFiveMoves => "DRAW! 75-move rule.".to_string(),
            GameStatus::FivefoldRepetition => "DRAW! Fivefold repetition.".to_string(),
            GameStatus::Check => format!("{} is in CHECK!", color_name(self.pos.turn())),
            GameStatus::Ongoing => format!("{} to move.", color_name(self.pos.turn())),
        }
    }

    /// Numbered SAN movetext, e.g. "1. e4 e5 2. Nf3 Nc6".
    pub fn movetext(&self) -> String {
        let mut out = String::new();
        for (i, mv) in self.history.iter().enumerate() {
            if i % 2 == 0 {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(&format!("{}. {}", i / 2 + 1, mv.san));
            } else {
                out.push_str(&format!(" {}", mv.san));
            }
        }
        out
    }
}

/// Piece placement, side to move, castling rights, and en-passant square —
/// the FEN fields that decide whether two positions repeat each other.
fn repetition_key(pos: &Chess) -> String {
    let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_twenty_legal_moves() {
        let game = Game::new();
        assert_eq!(game.legal_moves_uci().len(), 20);
        assert_eq!(game.fen(), STARTING_FEN);
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn legal_moves_are_sorted() {
        let game = Game::new();
        let moves = game.legal_moves_uci();
        assert_eq!(moves[0], "a2a3");
        assert!(moves.contains(&"e2e4".to_string()));
        let mut sorted = moves.clone();
        sorted.sort();
        assert_eq!(moves, sorted);
    }

    #[test]
    fn submit_e2e4() {
        let mut game = Game::new();
        let mv = game.submit("e2", "e4", None).unwrap();
        assert_eq!(mv.uci, "e2e4");
        assert_eq!(mv.san, "e4");
        assert_eq!(game.turn(), Color::Black);
        assert!(game.fen().starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b"));
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn illegal_move_leaves_position_untouched() {
        let mut game = Game::new();
        let err = game.submit("e2", "e5", None).unwrap_err();
        assert!(matches!(err, MoveError::Illegal(_)));
        assert_eq!(game.fen(), STARTING_FEN);
        assert!(game.history().is_empty());
    }

    #[test]
    fn garbage_squares_are_invalid_format() {
        let mut game = Game::new();
        let err = game.submit("z9", "e4", None).unwrap_err();
        assert!(matches!(err, MoveError::InvalidFormat(_)));
        assert_eq!(game.fen(), STARTING_FEN);
    }

    #[test]
    fn promotion_letter_ignored_on_ordinary_moves() {
        let mut game = Game::new();
        let mv = game.submit("e2", "e4", Some("q")).unwrap();
        assert_eq!(mv.uci, "e2e4");
    }

    #[test]
    fn promotion_applies_on_pawn_to_last_rank() {
        let mut game = Game::from_fen("8/P6k/8/8/8/8/7K/8 w - - 0 1").unwrap();
        let mv = game.submit("a7", "a8", Some("Q")).unwrap();
        assert_eq!(mv.uci, "a7a8q");
        assert_eq!(mv.san, "a8=Q");
        assert!(game.fen().starts_with("Q7/7k"));
    }

    #[test]
    fn fools_mate_is_checkmate_for_black() {
        let mut game = Game::new();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.apply_uci(uci).unwrap();
        }
        assert_eq!(
            game.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
        assert!(game.is_game_over());
        assert_eq!(game.status_text(), "CHECKMATE! Black wins.");
    }

    #[test]
    fn check_is_reported_but_not_game_over() {
        // 1. e4 f6 2. Qh5+
        let mut game = Game::new();
        for uci in ["e2e4", "f7f6", "d1h5"] {
            game.apply_uci(uci).unwrap();
        }
        assert_eq!(game.status(), GameStatus::Check);
        assert!(!game.is_game_over());
        assert_eq!(game.status_text(), "Black is in CHECK!");
    }

    #[test]
    fn movetext_is_numbered_san() {
        let mut game = Game::new();
        for uci in ["e2e4", "e7e5", "g1f3"] {
            game.apply_uci(uci).unwrap();
        }
        assert_eq!(game.movetext(), "1. e4 e5 2. Nf3");
    }

    #[test]
    fn castling_is_recorded_in_standard_uci() {
        let mut game = Game::new();
        for uci in ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"] {
            game.apply_uci(uci).unwrap();
        }
        let mv = game.apply_uci("e1g1").unwrap();
        assert_eq!(mv.uci, "e1g1");
        assert_eq!(mv.san, "O-O");
    }

    #[test]
    fn replay_matches_direct_rules_library_application() {
        use shakmaty::uci::UciMove;

        let line = ["d2d4", "g8f6", "c2c4", "e7e6", "b1c3", "f8b4"];

        let mut game = Game::new();
        let mut pos = Chess::default();
        for uci in line {
            game.apply_uci(uci).unwrap();
            let mv = uci.parse::<UciMove>().unwrap().to_move(&pos).unwrap();
            pos.play_unchecked(mv);
        }

        assert_eq!(
            game.fen(),
            Fen::from_position(&pos, EnPassantMode::Legal).to_string()
        );
    }

    #[test]
    fn reset_restores_starting_position() {
        let mut game = Game::new();
        game.apply_uci("e2e4").unwrap();
        game.reset();
        assert_eq!(game.fen(), STARTING_FEN);
        assert!(game.history().is_empty());
        assert_eq!(game.turn(), Color::White);
    }

    #[test]
    fn fivefold_repetition_is_a_draw() {
        let mut game = Game::new();
        // Knight shuffle; each cycle revisits the starting position.
        for _ in 0..4 {
            for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                game.apply_uci(uci).unwrap();
            }
        }
        assert_eq!(game.status(), GameStatus::FivefoldRepetition);
        assert!(game.is_game_over());
        assert_eq!(game.status_text(), "DRAW! Fivefold repetition.");
    }

    #[test]
    fn fourfold_repetition_is_not_yet_a_draw() {
        let mut game = Game::new();
        for _ in 0..3 {
            for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                game.apply_uci(uci).unwrap();
            }
        }
        assert_eq!(game.status(), GameStatus::Ongoing);
    }

    #[test]
    fn reset_clears_repetition_tracking() {
        let mut game = Game::new();
        for _ in 0..4 {
            for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                game.apply_uci(uci).unwrap();
            }
        }
        game.reset();
        assert_eq!(game.status(), GameStatus::Ongoing);
    }

    #[test]
    fn stalemate_is_detected() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game.status(), GameStatus::Stalemate);
        assert_eq!(game.status_text(), "STALEMATE! Draw.");
    }

    #[test]
    fn bare_kings_are_insufficient_material() {
        let game = Game::from_fen("8/8/4k3/8/8/4K3/8/8 w - - 0 1").unwrap();
        assert_eq!(game.status(), GameStatus::InsufficientMaterial);
        assert!(game.is_game_over());
    }
}
