//! Errors raised while turning notation text into a game.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// Text could not be segmented into move pairs.
    #[error("Could not parse")]
    Parse,

    /// One or more tokens fail the algebraic notation grammar.
    #[error("Invalid moves: {}", tokens.join(", "))]
    SyntacticInvalid { tokens: Vec<String> },

    /// The rules engine rejected a token during full replay.
    #[error("Illegal move '{token}' at ply {ply}")]
    SemanticIllegal { token: String, ply: usize },

    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

impl NotationError {
    /// Tokens a human should look at when fixing the text.
    pub fn offending_tokens(&self) -> Vec<String> {
        match self {
            NotationError::SyntacticInvalid { tokens } => tokens.clone(),
            NotationError::SemanticIllegal { token, .. } => vec![token.clone()],
            NotationError::Parse | NotationError::InvalidPosition(_) => Vec::new(),
        }
    }
}
