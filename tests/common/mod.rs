#![allow(dead_code)]

use notation_core::{build_game_history, GameInfo, MovePair};
use replay::{BoardRenderer, MarkerStyle};
use shakmaty::Color;

/// Opening with captures on both sides and castling for each color.
pub const ITALIAN: &str = "1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. c3 Nf6 5. d4 exd4 \
                           6. cxd4 Bb4+ 7. Nc3 Nxe4 8. O-O Nxc3 9. bxc3 Bxc3";

/// Queen's gambit line with kingside castling for black and queenside for white.
pub const QUEENS_GAMBIT: &str = "1. d4 d5 2. c4 e6 3. Nc3 Nf6 4. Bg5 Be7 5. e3 O-O \
                                 6. Nf3 Nbd7 7. Qc2 c5 8. O-O-O Qa5";

pub fn pairs(list: &[(&str, Option<&str>)]) -> Vec<MovePair> {
    list.iter().map(|(w, b)| MovePair::new(w, *b)).collect()
}

pub fn short_game() -> GameInfo {
    build_game_history(&pairs(&[
        ("e4", Some("e5")),
        ("Nf3", Some("Nc6")),
        ("Bb5", Some("a6")),
        ("Bxc6", Some("dxc6")),
        ("O-O", None),
    ]))
    .unwrap()
}

/// Renderer that keeps the board state a real renderer would show.
#[derive(Default)]
pub struct RecordingBoard {
    pub position: Option<String>,
    pub markers: Vec<(String, MarkerStyle)>,
    pub orientation: Option<Color>,
    pub renders: usize,
    pub destroyed: usize,
}

impl BoardRenderer for RecordingBoard {
    fn render(&mut self, _editable: bool) {
        self.renders += 1;
    }

    fn set_position(&mut self, position: &str, _animate: bool) {
        self.position = Some(position.to_string());
    }

    fn add_marker(&mut self, square: &str, style: MarkerStyle) {
        self.markers.push((square.to_string(), style));
    }

    fn remove_markers(&mut self, style: Option<MarkerStyle>) {
        match style {
            Some(style) => self.markers.retain(|(_, s)| *s != style),
            None => self.markers.clear(),
        }
    }

    fn orientation(&self) -> Color {
        self.orientation.unwrap_or(Color::White)
    }

    fn set_orientation(&mut self, color: Color) {
        self.orientation = Some(color);
    }

    fn destroy(&mut self) {
        self.destroyed += 1;
    }
}
