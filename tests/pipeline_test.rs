/// End-to-end checks of the notation import pipeline:
/// normalize -> parse -> correct -> grammar check -> full replay.
mod common;

use common::{pairs, ITALIAN, QUEENS_GAMBIT};
use notation_core::{
    build_game_history, correct_misreads, normalize, parse_notation, read_pairs, NotationError,
    Piece,
};
use scanner::recovery::{ImportSession, Outcome};
use shakmaty::{fen::Fen, san::San, Chess, EnPassantMode, Position};

/// Replay SAN tokens directly with shakmaty, independent of the pipeline.
fn reference_fen(tokens: &[&str]) -> String {
    let mut pos = Chess::default();
    for token in tokens {
        let san: San = token.trim_end_matches(['+', '#']).parse().unwrap();
        let mv = san.to_move(&pos).unwrap();
        pos.play_unchecked(mv);
    }
    Fen::from_position(&pos, EnPassantMode::Legal).to_string()
}

fn import(text: &str) -> Result<notation_core::GameInfo, NotationError> {
    build_game_history(&read_pairs(&normalize(text))?)
}

#[test]
fn test_normalize_is_idempotent() {
    let samples = [
        "",
        "  l. €4 e5!! 2. Nf3? Nc6\n3. Bb5 a6 ",
        "1. d4 d5 2. 0-0 o-o-o\r\n3. O-0 0-O",
        "l.e4 £5 ½-½",
        ITALIAN,
    ];
    for sample in samples {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "input {sample:?}");
    }
}

#[test]
fn test_castling_spellings() {
    for spelling in ["0-0", "o-o", "0-O", "O-0", "O-O"] {
        assert_eq!(normalize(spelling), "O-O", "spelling {spelling}");
    }
    assert_eq!(normalize("0-0-0"), "O-O-O");
    assert_eq!(normalize("1. 0-0 o-o-o"), "1. O-O O-O-O");
}

#[test]
fn test_round_trip_matches_reference() {
    for text in [ITALIAN, QUEENS_GAMBIT] {
        let pairs = read_pairs(&normalize(text)).unwrap();
        let game = build_game_history(&pairs).unwrap();
        assert_eq!(game.total_moves, pairs.len());

        let tokens: Vec<&str> = pairs.iter().flat_map(|p| p.tokens()).collect();
        assert_eq!(game.final_position(), Some(reference_fen(&tokens).as_str()));
    }
}

#[test]
fn test_movetext_reimports_to_same_game() {
    let game = import(QUEENS_GAMBIT).unwrap();
    let again = import(&game.to_movetext()).unwrap();
    assert_eq!(again, game);
}

#[test]
fn test_fail_fast_on_illegal_ply() {
    // Ply 5 (white's third move) moves a bishop through its own pawn.
    let err = import("1. d4 d5 2. c4 e6 3. Bg2 Nf6").unwrap_err();
    assert_eq!(
        err,
        NotationError::SemanticIllegal {
            token: "Bg2".to_string(),
            ply: 4
        }
    );
}

#[test]
fn test_capture_accounting() {
    let game = import("1. e4 d5 2. exd5").unwrap();
    let (white, black) = game.captured_at(0).unwrap();
    assert!(white.is_empty() && black.is_empty());

    let (white, black) = game.captured_at(1).unwrap();
    assert_eq!(white, &[Piece::Pawn]);
    assert!(black.is_empty());
}

#[test]
fn test_italian_capture_totals() {
    let game = import(ITALIAN).unwrap();
    let last = game.moves.last().unwrap();
    assert_eq!(last.white_captured, vec![Piece::Pawn, Piece::Knight]);
    assert_eq!(
        last.black_captured,
        vec![Piece::Pawn, Piece::Pawn, Piece::Knight, Piece::Pawn]
    );
}

#[test]
fn test_misread_correction() {
    let corrected = correct_misreads(&pairs(&[("Nl", Some("Rad")), ("e4", None)]));
    assert_eq!(corrected, pairs(&[("N1", Some("Ra4")), ("e4", None)]));
}

#[test]
fn test_ocr_noise_still_imports() {
    // Leading `l` for the first move number, a currency glyph for `e`,
    // annotation marks and a misread rank digit.
    let game = import("l. €4 c5!\n2. Nf3 d6?! 3. d4 cxd4 4. Nxd4 Nf6 5. Nc3 aS").unwrap();
    assert_eq!(game.total_moves, 5);
    assert_eq!(game.moves[4].black_move.as_deref(), Some("a5"));
}

#[test]
fn test_bare_text_has_no_pairs() {
    assert!(parse_notation(&normalize("e4 e5 Nf3 Nc6")).unwrap().is_empty());
}

#[test]
fn test_recovery_merges_against_accepted_game() {
    let mut session = ImportSession::new();
    assert!(matches!(session.submit("1. e4 e5 2. Nf3"), Outcome::Accepted(_)));

    // The failed attempt is not kept; the correction is merged with the accepted moves.
    let Outcome::NeedsCorrection(request) = session.submit("1. Kxe8") else {
        panic!("expected a correction request");
    };
    assert_eq!(request.errors, vec!["Kxe8"]);
    assert_eq!(session.game().unwrap().total_moves, 2);

    session.clear();
    let Outcome::Accepted(game) = session.submit("1. d4") else {
        panic!("a cleared session starts a new game");
    };
    assert_eq!(game.total_moves, 1);
}
