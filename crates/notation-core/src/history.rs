//! Full replay of a move list into a validated [`GameInfo`].
//!
//! Every call replays from the start position. The accepted game is always
//! confirmed by the rules engine end to end; nothing is patched incrementally.

use shakmaty::Color;
use tracing::{debug, warn};

use crate::engine::{PlyOutcome, RulesEngine, ShakmatyEngine};
use crate::error::NotationError;
use crate::game_data::{GameInfo, GameMove, MovePair, Piece};

/// Running capture lists, one per capturing side.
#[derive(Default)]
struct Captures {
    white: Vec<Piece>,
    black: Vec<Piece>,
}

impl Captures {
    fn record<E: RulesEngine>(&mut self, engine: &E) {
        let Some(last) = engine.history().last() else {
            return;
        };
        if let Some(piece) = last.captured {
            match last.color {
                Color::White => self.white.push(piece),
                Color::Black => self.black.push(piece),
            }
        }
    }
}

/// Replay `pairs` with the default shakmaty engine.
pub fn build_game_history(pairs: &[MovePair]) -> Result<GameInfo, NotationError> {
    build_game_history_with(&mut ShakmatyEngine::new(), pairs)
}

/// Replay the complete move list (accepted history plus anything new) on
/// `engine`. The first rejected ply aborts the whole build.
pub fn build_game_history_with<E: RulesEngine>(
    engine: &mut E,
    pairs: &[MovePair],
) -> Result<GameInfo, NotationError> {
    engine.new_game();
    let mut captures = Captures::default();
    let mut moves = Vec::with_capacity(pairs.len());

    for (i, pair) in pairs.iter().enumerate() {
        let white = play_ply(engine, &pair.white, i * 2)?;
        captures.record(engine);

        let black = match pair.black.as_deref() {
            Some(token) => {
                let outcome = play_ply(engine, token, i * 2 + 1)?;
                captures.record(engine);
                Some(outcome)
            }
            None => None,
        };

        moves.push(GameMove {
            white_move: pair.white.clone(),
            black_move: pair.black.clone(),
            white_move_from: white.from,
            black_move_from: black.as_ref().map(|b| b.from.clone()),
            white_position_after: white.position,
            black_position_after: black.map(|b| b.position),
            white_captured: captures.white.clone(),
            black_captured: captures.black.clone(),
        });
    }

    debug!(moves = moves.len(), "game history rebuilt");
    Ok(GameInfo::from_moves(moves))
}

fn play_ply<E: RulesEngine>(
    engine: &mut E,
    token: &str,
    ply: usize,
) -> Result<PlyOutcome, NotationError> {
    engine.play(token).ok_or_else(|| {
        warn!(token, ply, "rules engine rejected move");
        NotationError::SemanticIllegal {
            token: token.to_string(),
            ply,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PlyRecord;

    fn pairs(list: &[(&str, Option<&str>)]) -> Vec<MovePair> {
        list.iter().map(|(w, b)| MovePair::new(w, *b)).collect()
    }

    #[test]
    fn test_capture_accounting() {
        let game = build_game_history(&pairs(&[("e4", Some("d5")), ("exd5", None)])).unwrap();
        assert_eq!(game.total_moves, 2);
        assert!(game.moves[0].white_captured.is_empty());
        assert!(game.moves[0].black_captured.is_empty());
        assert_eq!(game.moves[1].white_captured, vec![Piece::Pawn]);
        assert!(game.moves[1].black_captured.is_empty());
        assert_eq!(game.moves[1].white_move_from, "e4");
        assert_eq!(game.moves[1].black_position_after, None);
    }

    #[test]
    fn test_black_captures_accumulate() {
        let game = build_game_history(&pairs(&[
            ("e4", Some("c5")),
            ("d4", Some("cxd4")),
            ("c3", Some("dxc3")),
            ("bxc3", Some("e6")),
        ]))
        .unwrap();
        assert_eq!(game.moves[1].black_captured, vec![Piece::Pawn]);
        assert_eq!(game.moves[2].black_captured, vec![Piece::Pawn, Piece::Pawn]);
        assert_eq!(game.moves[3].white_captured, vec![Piece::Pawn]);
        assert_eq!(game.moves[3].black_move_from.as_deref(), Some("e7"));
    }

    #[test]
    fn test_fail_fast_reports_first_illegal_ply() {
        let err = build_game_history(&pairs(&[
            ("e4", Some("e5")),
            ("Nf3", Some("Ke7")),
            ("Qh5", Some("Nf6")),
            ("Bb5", None),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            NotationError::SemanticIllegal {
                token: "Qh5".to_string(),
                ply: 4
            }
        );
    }

    #[test]
    fn test_illegal_black_ply() {
        let err = build_game_history(&pairs(&[("d4", Some("e4"))])).unwrap_err();
        assert_eq!(err.offending_tokens(), vec!["e4".to_string()]);
    }

    /// Engine that accepts every token, to check the builder only trusts the engine.
    #[derive(Default)]
    struct AcceptAll {
        plies: usize,
        history: Vec<PlyRecord>,
    }

    impl RulesEngine for AcceptAll {
        fn new_game(&mut self) {
            self.plies = 0;
            self.history.clear();
        }

        fn play(&mut self, token: &str) -> Option<PlyOutcome> {
            let color = if self.plies % 2 == 0 { Color::White } else { Color::Black };
            self.plies += 1;
            let captured = token.contains('x').then_some(Piece::Knight);
            self.history.push(PlyRecord { color, captured });
            Some(PlyOutcome {
                from: "a1".into(),
                to: "a2".into(),
                position: format!("ply-{}", self.plies),
            })
        }

        fn play_squares(&mut self, _from: &str, _to: &str) -> Option<PlyOutcome> {
            None
        }

        fn position(&self) -> String {
            format!("ply-{}", self.plies)
        }

        fn history(&self) -> &[PlyRecord] {
            &self.history
        }

        fn load(&mut self, _position: &str) -> Result<(), NotationError> {
            Ok(())
        }

        fn legal_destinations(&self, _from: &str) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_custom_engine() {
        let mut engine = AcceptAll::default();
        let game = build_game_history_with(
            &mut engine,
            &pairs(&[("Zz1", Some("Qxq9")), ("whatever", None)]),
        )
        .unwrap();
        assert_eq!(game.moves[0].position_after(), "ply-2");
        assert_eq!(game.moves[1].position_after(), "ply-3");
        assert_eq!(game.moves[1].black_captured, vec![Piece::Knight]);
    }
}
