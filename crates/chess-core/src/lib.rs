pub mod game;

pub use game::{color_name, Game, GameStatus, MoveError, RecordedMove, STARTING_FEN};
