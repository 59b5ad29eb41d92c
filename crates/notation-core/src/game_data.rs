use serde::{Deserialize, Serialize};
use shakmaty::Role;

/// A captured piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    /// Material value used for the captured-material score.
    pub fn points(self) -> i32 {
        match self {
            Piece::Queen => 9,
            Piece::Rook => 5,
            Piece::Bishop | Piece::Knight => 3,
            Piece::Pawn => 1,
            Piece::King => 0,
        }
    }
}

impl From<Role> for Piece {
    fn from(role: Role) -> Self {
        match role {
            Role::Pawn => Piece::Pawn,
            Role::Knight => Piece::Knight,
            Role::Bishop => Piece::Bishop,
            Role::Rook => Piece::Rook,
            Role::Queen => Piece::Queen,
            Role::King => Piece::King,
        }
    }
}

/// One numbered move as read from the notation: white's ply and, except
/// possibly for the last pair, black's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePair {
    pub white: String,
    pub black: Option<String>,
}

impl MovePair {
    pub fn new(white: &str, black: Option<&str>) -> Self {
        Self {
            white: white.to_string(),
            black: black.map(str::to_string),
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.white.as_str()).chain(self.black.as_deref())
    }
}

/// A validated move with the positions it produced.
///
/// Capture lists are cumulative: they hold everything each side has taken up
/// to and including this move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMove {
    pub white_move: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_move: Option<String>,
    pub white_move_from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_move_from: Option<String>,
    #[serde(rename = "whiteFenPosition")]
    pub white_position_after: String,
    #[serde(rename = "blackFenPosition", default, skip_serializing_if = "Option::is_none")]
    pub black_position_after: Option<String>,
    pub white_captured: Vec<Piece>,
    pub black_captured: Vec<Piece>,
}

impl GameMove {
    /// Position once the whole move (both plies, if present) has been played.
    pub fn position_after(&self) -> &str {
        self.black_position_after
            .as_deref()
            .unwrap_or(&self.white_position_after)
    }

    pub fn to_pair(&self) -> MovePair {
        MovePair {
            white: self.white_move.clone(),
            black: self.black_move.clone(),
        }
    }
}

/// A fully validated game. Rebuilt wholesale on every accepted edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub moves: Vec<GameMove>,
    pub total_moves: usize,
}

impl GameInfo {
    pub(crate) fn from_moves(moves: Vec<GameMove>) -> Self {
        let total_moves = moves.len();
        Self { moves, total_moves }
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Move pairs this game was built from, for merging with new input.
    pub fn to_pairs(&self) -> Vec<MovePair> {
        self.moves.iter().map(GameMove::to_pair).collect()
    }

    /// Position after the last move, if any move was played.
    pub fn final_position(&self) -> Option<&str> {
        self.moves.last().map(GameMove::position_after)
    }

    /// Capture lists (white's, black's) as of the move at `index`.
    pub fn captured_at(&self, index: usize) -> Option<(&[Piece], &[Piece])> {
        self.moves
            .get(index)
            .map(|m| (m.white_captured.as_slice(), m.black_captured.as_slice()))
    }

    /// Numbered movetext (`1. e4 e5 2. Nf3`) that parses back into the same pairs.
    pub fn to_movetext(&self) -> String {
        self.moves
            .iter()
            .enumerate()
            .map(|(i, m)| match &m.black_move {
                Some(black) => format!("{}. {} {}", i + 1, m.white_move, black),
                None => format!("{}. {}", i + 1, m.white_move),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Signed material advantage `(white, black)` from the pieces each side captured.
/// Equal material gives `(0, 0)`.
pub fn material_score(white_captured: &[Piece], black_captured: &[Piece]) -> (i32, i32) {
    let white: i32 = white_captured.iter().map(|p| p.points()).sum();
    let black: i32 = black_captured.iter().map(|p| p.points()).sum();
    (white - black, black - white)
}
