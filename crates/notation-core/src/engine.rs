//! Rules-engine seam used for full game replay, and its shakmaty implementation.

use shakmaty::{
    fen::Fen, san::SanPlus, CastlingMode, Chess, Color, EnPassantMode, File, Move, Position,
    Square,
};

use crate::error::NotationError;
use crate::game_data::Piece;

/// Result of a ply the engine accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyOutcome {
    pub from: String,
    pub to: String,
    /// Position encoding (FEN) after the ply.
    pub position: String,
}

/// One entry of the engine's move history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlyRecord {
    pub color: Color,
    pub captured: Option<Piece>,
}

/// A chess rules engine. Illegal input is reported as `None`, never as a panic.
pub trait RulesEngine {
    /// Reset to the standard start position with an empty history.
    fn new_game(&mut self);

    /// Play a SAN token for the side to move.
    fn play(&mut self, token: &str) -> Option<PlyOutcome>;

    /// Play a move given by its origin and destination squares.
    fn play_squares(&mut self, from: &str, to: &str) -> Option<PlyOutcome>;

    /// FEN of the current position.
    fn position(&self) -> String;

    /// Plies played since the last `new_game`/`load`, oldest first.
    fn history(&self) -> &[PlyRecord];

    /// Replace the current position. Clears the history.
    fn load(&mut self, position: &str) -> Result<(), NotationError>;

    /// Destination squares of the legal moves starting on `from`.
    fn legal_destinations(&self, from: &str) -> Vec<String>;
}

/// [`RulesEngine`] backed by shakmaty.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyEngine {
    pos: Chess,
    history: Vec<PlyRecord>,
}

impl ShakmatyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(&mut self, mv: Move) -> PlyOutcome {
        let color = self.pos.turn();
        let from = mv.from().map(|sq| sq.to_string()).unwrap_or_default();
        let to = destination(&mv).to_string();
        let captured = mv.capture().map(Piece::from);

        self.pos.play_unchecked(mv);
        self.history.push(PlyRecord { color, captured });

        PlyOutcome {
            from,
            to,
            position: self.position(),
        }
    }
}

/// Where the king or moving piece ends up. shakmaty encodes castling as
/// king-takes-rook, so the king's real destination is derived from the rook side.
fn destination(mv: &Move) -> Square {
    match mv {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            Square::from_coords(file, king.rank())
        }
        other => other.to(),
    }
}

impl RulesEngine for ShakmatyEngine {
    fn new_game(&mut self) {
        self.pos = Chess::default();
        self.history.clear();
    }

    fn play(&mut self, token: &str) -> Option<PlyOutcome> {
        let san: SanPlus = token.parse().ok()?;
        let mv = san.san.to_move(&self.pos).ok()?;
        Some(self.apply(mv))
    }

    fn play_squares(&mut self, from: &str, to: &str) -> Option<PlyOutcome> {
        let from: Square = from.parse().ok()?;
        let to: Square = to.parse().ok()?;
        let mv = self
            .pos
            .legal_moves()
            .into_iter()
            .filter(|m| m.from() == Some(from) && destination(m) == to)
            // Under-promotions need an explicit choice; default to the queen.
            .max_by_key(|m| m.promotion().map(|r| r as u8).unwrap_or(0))?;
        Some(self.apply(mv))
    }

    fn position(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    fn history(&self) -> &[PlyRecord] {
        &self.history
    }

    fn load(&mut self, position: &str) -> Result<(), NotationError> {
        let fen: Fen = position
            .parse()
            .map_err(|e| NotationError::InvalidPosition(format!("{position}: {e}")))?;
        let pos: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| NotationError::InvalidPosition(format!("{position}: {e}")))?;
        self.pos = pos;
        self.history.clear();
        Ok(())
    }

    fn legal_destinations(&self, from: &str) -> Vec<String> {
        let Ok(from) = from.parse::<Square>() else {
            return Vec::new();
        };
        let mut squares: Vec<String> = self
            .pos
            .legal_moves()
            .iter()
            .filter(|m| m.from() == Some(from))
            .map(|m| destination(m).to_string())
            .collect();
        squares.dedup();
        squares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::START_FEN;

    #[test]
    fn test_play_and_history() {
        let mut engine = ShakmatyEngine::new();
        let ply = engine.play("e4").unwrap();
        assert_eq!(ply.from, "e2");
        assert_eq!(ply.to, "e4");
        engine.play("d5").unwrap();
        let capture = engine.play("exd5").unwrap();
        assert_eq!(capture.to, "d5");

        let history = engine.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].color, Color::White);
        assert_eq!(history[2].captured, Some(Piece::Pawn));
        assert_eq!(history[1].captured, None);
    }

    #[test]
    fn test_illegal_move_returns_none() {
        let mut engine = ShakmatyEngine::new();
        assert!(engine.play("e5").is_none());
        assert!(engine.play("Qh5").is_none());
        assert!(engine.play("not-a-move").is_none());
        assert_eq!(engine.position(), START_FEN);
    }

    #[test]
    fn test_castling_squares() {
        let mut engine = ShakmatyEngine::new();
        for token in ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"] {
            engine.play(token).unwrap();
        }
        let castle = engine.play("O-O").unwrap();
        assert_eq!(castle.from, "e1");
        assert_eq!(castle.to, "g1");
    }

    #[test]
    fn test_load_and_legal_destinations() {
        let mut engine = ShakmatyEngine::new();
        engine.play("e4").unwrap();
        let fen = engine.position();

        let mut other = ShakmatyEngine::new();
        other.load(&fen).unwrap();
        assert!(other.history().is_empty());
        assert_eq!(other.position(), fen);

        let mut knight = other.legal_destinations("g8");
        knight.sort();
        assert_eq!(knight, vec!["f6", "h6"]);
        assert!(other.legal_destinations("zz").is_empty());
        assert!(other.load("not a fen").is_err());
    }

    #[test]
    fn test_play_squares() {
        let mut engine = ShakmatyEngine::new();
        assert!(engine.play_squares("e2", "e5").is_none());
        let ply = engine.play_squares("g1", "f3").unwrap();
        assert_eq!(ply.from, "g1");
        assert_eq!(engine.history().len(), 1);
    }
}
