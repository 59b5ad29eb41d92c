//! Deterministic cleanup of raw OCR text ahead of move parsing.

use std::sync::LazyLock;

use regex::Regex;

/// Glyphs OCR tends to produce in place of file letters.
const GLYPH_MAP: &[(char, char)] = &[('€', 'e'), ('£', 'f')];

/// Any two- or three-part castling spelling built from `0`, `o` and `O`.
static CASTLING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0oO]-[0oO](?:-[0oO])?").expect("castling regex"));

/// Clean raw OCR text into normalized notation text.
///
/// Never fails. Applying it to its own output is a no-op.
pub fn normalize(raw: &str) -> String {
    let mapped: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '!' | '?'))
        .map(|c| {
            GLYPH_MAP
                .iter()
                .find(|(glyph, _)| *glyph == c)
                .map(|(_, ascii)| *ascii)
                .unwrap_or(c)
        })
        .map(|c| if matches!(c, '\n' | '\r') { ' ' } else { c })
        .collect();

    let castled = CASTLING_RE.replace_all(&mapped, |caps: &regex::Captures| {
        if caps[0].len() > 3 {
            "O-O-O"
        } else {
            "O-O"
        }
    });

    let text = castled.trim();

    // A leading 'l' is almost always a misread move number 1.
    match text.strip_prefix('l') {
        Some(rest) => format!("1{rest}"),
        None => text.to_string(),
    }
}
