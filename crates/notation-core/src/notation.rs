//! Move-pair parsing, OCR misread correction and the algebraic grammar check.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::NotationError;
use crate::game_data::MovePair;

const SHORT_CASTLE: &str = "O-O";
const LONG_CASTLE: &str = "O-O-O";
const SHORT_CASTLE_WORD: &str = "SHORTCASTLE";
const LONG_CASTLE_WORD: &str = "LONGCASTLE";

/// Game termination markers that may trail the last move.
const RESULT_TOKENS: &[&str] = &["1-0", "0-1", "1/2-1/2", "½-½", "*"];

/// A move number marker: whitespace, digits, a period.
static MOVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s[0-9]+\.").expect("move number regex"));

static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[NBRQK]?[a-h]?[1-8]?x?[a-h][1-8](?:=[NBRQK])?[+#]?|O-O(?:-O)?[+#]?)$")
        .expect("move grammar regex")
});

/// Split normalized notation text into ordered move pairs.
///
/// Numbered text (`1. e4 e5 2. Nf3`) is split on its move numbers. Text that
/// does not start with a digit yields no pairs.
pub fn parse_notation(text: &str) -> Result<Vec<MovePair>, NotationError> {
    // Castling hyphens and letters must not take part in the structural split.
    let protected = text
        .replace(LONG_CASTLE, LONG_CASTLE_WORD)
        .replace(SHORT_CASTLE, SHORT_CASTLE_WORD);

    if !protected.starts_with(|c: char| c.is_ascii_digit()) {
        debug!("notation is not a numbered list, no pairs read");
        return Ok(Vec::new());
    }

    let padded = format!(" {protected}");
    let segments: Vec<&str> = MOVE_NUMBER_RE
        .split(&padded)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    let mut pairs = Vec::with_capacity(segments.len());
    let last = segments.len().saturating_sub(1);

    for (i, segment) in segments.iter().enumerate() {
        let tokens: Vec<String> = segment
            .split_whitespace()
            .map(|t| t.replace('.', ""))
            .filter(|t| !t.is_empty() && !RESULT_TOKENS.contains(&t.as_str()))
            .map(|t| restore_castling(&t))
            .collect();

        match tokens.as_slice() {
            [] => continue,
            [white] if i == last => pairs.push(MovePair::new(white, None)),
            [white, black] => pairs.push(MovePair::new(white, Some(black))),
            _ => {
                debug!(segment, tokens = tokens.len(), "move segment has the wrong shape");
                return Err(NotationError::Parse);
            }
        }
    }

    Ok(pairs)
}

fn restore_castling(token: &str) -> String {
    token
        .replace(LONG_CASTLE_WORD, LONG_CASTLE)
        .replace(SHORT_CASTLE_WORD, SHORT_CASTLE)
}

/// Fix the rank digits OCR most often misreads as letters.
pub fn correct_token(token: &str) -> String {
    let Some((idx, last)) = token.char_indices().last() else {
        return token.to_string();
    };

    let digit = match last.to_ascii_lowercase() {
        'l' => '1',
        's' => '5',
        'd' => '4',
        _ => return token.to_string(),
    };

    format!("{}{digit}", &token[..idx])
}

/// Apply [`correct_token`] to every token of every pair.
pub fn correct_misreads(pairs: &[MovePair]) -> Vec<MovePair> {
    pairs
        .iter()
        .map(|pair| MovePair {
            white: correct_token(&pair.white),
            black: pair.black.as_deref().map(correct_token),
        })
        .collect()
}

/// Re-pair a flat ply list in turn order: white, black, white, ...
/// Only the last pair can lack a black ply.
pub fn pair_plies<I, S>(plies: I) -> Vec<MovePair>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut pairs = Vec::new();
    let mut plies = plies.into_iter().map(Into::into);
    while let Some(white) = plies.next() {
        pairs.push(MovePair {
            white,
            black: plies.next(),
        });
    }
    pairs
}

/// Whether a single token is well-formed algebraic notation.
pub fn is_valid_token(token: &str) -> bool {
    !token.starts_with(|c: char| c.is_ascii_digit()) && MOVE_RE.is_match(token)
}

/// Tokens that fail the notation grammar, in game order. Empty means all valid.
pub fn validate_syntax(pairs: &[MovePair]) -> Vec<String> {
    pairs
        .iter()
        .flat_map(MovePair::tokens)
        .filter(|token| !is_valid_token(token))
        .map(str::to_string)
        .collect()
}

/// Parse, correct and grammar-check normalized text.
pub fn read_pairs(normalized: &str) -> Result<Vec<MovePair>, NotationError> {
    let pairs = correct_misreads(&parse_notation(normalized)?);
    let invalid = validate_syntax(&pairs);
    if !invalid.is_empty() {
        return Err(NotationError::SyntacticInvalid { tokens: invalid });
    }
    Ok(pairs)
}

/// Square a token's piece lands on, e.g. `f3` for `Nf3+` and `e8` for `e8=Q`.
/// Castling tokens have no single destination and return `None`.
pub fn destination_square(token: &str) -> Option<&str> {
    if is_castling(token) || is_long_castling(token) {
        return None;
    }
    let trimmed = token.trim_end_matches(['+', '#']);
    let trimmed = match trimmed.find('=') {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };
    let start = trimmed.len().checked_sub(2)?;
    trimmed.get(start..)
}

pub fn is_castling(token: &str) -> bool {
    let token = token.trim_end_matches(['+', '#']);
    token.eq_ignore_ascii_case("o-o") || token == "0-0"
}

pub fn is_long_castling(token: &str) -> bool {
    let token = token.trim_end_matches(['+', '#']);
    token.eq_ignore_ascii_case("o-o-o") || token == "0-0-0"
}
