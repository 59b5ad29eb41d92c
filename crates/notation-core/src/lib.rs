//! Notation import core: OCR text cleanup, move-pair parsing, misread
//! correction, grammar checks and full game replay against a rules engine.

pub mod engine;
pub mod error;
pub mod game_data;
pub mod history;
pub mod normalize;
pub mod notation;

pub use engine::{PlyOutcome, PlyRecord, RulesEngine, ShakmatyEngine};
pub use error::NotationError;
pub use game_data::{material_score, GameInfo, GameMove, MovePair, Piece};
pub use history::{build_game_history, build_game_history_with};
pub use normalize::normalize;
pub use notation::{correct_misreads, pair_plies, parse_notation, read_pairs, validate_syntax};

/// Standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
