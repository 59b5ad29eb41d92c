//! Board renderer seam. The controller is the only caller.

use serde::{Deserialize, Serialize};
use shakmaty::Color;

/// Square marker kinds the replay draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    /// Origin/destination of a white ply.
    WhiteMove,
    /// Origin/destination of a black ply.
    BlackMove,
    /// Legal destination while the user drags a piece.
    Dot,
}

impl MarkerStyle {
    pub fn for_color(color: Color) -> Self {
        match color {
            Color::White => MarkerStyle::WhiteMove,
            Color::Black => MarkerStyle::BlackMove,
        }
    }
}

/// Something that can draw a chess position.
///
/// `set_position` with `animate` starts an animation; the controller waits
/// the configured animation duration before treating it as complete.
pub trait BoardRenderer {
    fn render(&mut self, editable: bool);

    fn set_position(&mut self, position: &str, animate: bool);

    fn add_marker(&mut self, square: &str, style: MarkerStyle);

    /// Remove markers of one style, or all of them with `None`.
    fn remove_markers(&mut self, style: Option<MarkerStyle>);

    fn orientation(&self) -> Color;

    fn set_orientation(&mut self, color: Color);

    fn destroy(&mut self);
}
