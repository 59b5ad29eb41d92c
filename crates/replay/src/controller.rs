//! Navigation state machine over a built game.
//!
//! Indexes address `GameInfo::moves`, so one step forward plays a white ply
//! and, when present, the black reply. Only post-move positions are cached;
//! stepping back resets to an earlier snapshot and replays one move forward.
//!
//! Every navigation request turns into a queue of animation steps tagged with
//! an [`AnimationTicket`]. The caller runs the steps with [`ReplayController::advance`],
//! waiting the returned duration in between. Any state change that abandons an
//! animation bumps the epoch, so steps issued under an older ticket are ignored.

use std::collections::VecDeque;
use std::time::Duration;

use notation_core::notation::{destination_square, is_castling, is_long_castling};
use notation_core::{GameInfo, Piece, RulesEngine, ShakmatyEngine, START_FEN};
use serde::Serialize;
use shakmaty::Color;
use tracing::{debug, info, warn};

use crate::board::{BoardRenderer, MarkerStyle};
use crate::error::ReplayError;

/// Timing of the replay animations and auto-play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayTimings {
    /// Auto-play tick.
    pub playback_interval: Duration,
    /// Settle time after a board reset before the replayed move starts.
    pub move_time: Duration,
    /// Gap between the start of the white and the black ply of one move.
    pub black_move_delay: Duration,
    /// Renderer animation duration.
    pub animation: Duration,
}

impl Default for ReplayTimings {
    fn default() -> Self {
        Self {
            playback_interval: Duration::from_millis(2800),
            move_time: Duration::from_millis(1200),
            black_move_delay: Duration::from_millis(1700),
            animation: Duration::from_millis(375),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReplayMode {
    /// No game loaded.
    Idle,
    Viewing,
    Playing,
    /// A move animation is running; navigation requests are dropped.
    Animating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplayState {
    /// Index into the game's moves; -1 before the first move.
    pub current_move_index: isize,
    pub mode: ReplayMode,
}

/// Identifies one animation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Show a cached post-move snapshot (`None` = start) without animating.
    Reset { snapshot: Option<usize> },
    /// Mark the origin square and animate to the ply's position.
    Lift { index: usize, color: Color },
    /// Mark the destination square once the animation has landed.
    Land { index: usize, color: Color },
}

/// Owned copy of what one ply needs for drawing.
struct PlyView {
    from_square: String,
    to_square: Option<String>,
    position: String,
}

pub struct ReplayController<R, E = ShakmatyEngine> {
    renderer: R,
    engine: E,
    game: Option<GameInfo>,
    timings: ReplayTimings,
    index: isize,
    autoplay: bool,
    steps: VecDeque<Step>,
    epoch: u64,
}

impl<R: BoardRenderer> ReplayController<R, ShakmatyEngine> {
    pub fn new(renderer: R, timings: ReplayTimings) -> Self {
        Self::with_engine(renderer, ShakmatyEngine::new(), timings)
    }
}

impl<R: BoardRenderer, E: RulesEngine> ReplayController<R, E> {
    pub fn with_engine(renderer: R, engine: E, timings: ReplayTimings) -> Self {
        Self {
            renderer,
            engine,
            game: None,
            timings,
            index: -1,
            autoplay: false,
            steps: VecDeque::new(),
            epoch: 0,
        }
    }

    pub fn state(&self) -> ReplayState {
        ReplayState {
            current_move_index: self.index,
            mode: self.mode(),
        }
    }

    pub fn mode(&self) -> ReplayMode {
        if self.game.is_none() {
            ReplayMode::Idle
        } else if !self.steps.is_empty() {
            ReplayMode::Animating
        } else if self.autoplay {
            ReplayMode::Playing
        } else {
            ReplayMode::Viewing
        }
    }

    pub fn is_animating(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Whether auto-play is on, including while its current move animates.
    pub fn is_auto_playing(&self) -> bool {
        self.game.is_some() && self.autoplay
    }

    pub fn game(&self) -> Option<&GameInfo> {
        self.game.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn timings(&self) -> ReplayTimings {
        self.timings
    }

    /// Capture lists (white's, black's) at the current move.
    pub fn captured(&self) -> (&[Piece], &[Piece]) {
        const NONE: &[Piece] = &[];
        usize::try_from(self.index)
            .ok()
            .and_then(|i| self.game.as_ref()?.captured_at(i))
            .unwrap_or((NONE, NONE))
    }

    /// Show a new game at the start position. Replaces any previous game.
    pub fn load(&mut self, game: GameInfo, editable: bool) {
        self.cancel_pending();
        if self.game.is_some() {
            self.renderer.destroy();
        }
        info!(moves = game.total_moves, "loading game into replay");
        self.game = Some(game);
        self.index = -1;
        self.autoplay = false;
        self.engine.new_game();
        self.renderer.render(editable);
        self.renderer.set_position(START_FEN, false);
    }

    /// Step one move forward. At the last move this only stops auto-play.
    pub fn next(&mut self) -> Option<AnimationTicket> {
        let total = self.game.as_ref()?.moves.len();
        if self.is_animating() {
            debug!("next dropped while animating");
            return None;
        }

        let target = self.index + 1;
        if target as usize >= total {
            if self.autoplay {
                info!("reached the last move, stopping playback");
            }
            self.autoplay = false;
            return None;
        }

        self.index = target;
        Some(self.start(self.move_steps(target as usize)))
    }

    /// Step one move back by resetting to an earlier snapshot.
    pub fn prev(&mut self) -> Option<AnimationTicket> {
        self.game.as_ref()?;
        if self.is_animating() {
            debug!("prev dropped while animating");
            return None;
        }

        let steps = match self.index {
            i if i < 0 => return None,
            0 => {
                self.index = -1;
                vec![Step::Reset { snapshot: None }]
            }
            1 => {
                self.index = 0;
                let mut steps = vec![Step::Reset { snapshot: None }];
                steps.extend(self.move_steps(0));
                steps
            }
            i => {
                let i = i as usize;
                self.index = (i - 1) as isize;
                let mut steps = vec![Step::Reset {
                    snapshot: Some(i - 2),
                }];
                steps.extend(self.move_steps(i - 1));
                steps
            }
        };

        Some(self.start(steps))
    }

    /// Start auto-play. The first move is played immediately.
    pub fn play(&mut self) -> Option<AnimationTicket> {
        self.game.as_ref()?;
        if self.is_animating() || self.autoplay {
            return None;
        }
        self.autoplay = true;
        let ticket = self.next();
        if self.autoplay {
            info!(index = self.index, "playback started");
        }
        ticket
    }

    /// Stop auto-play. A running animation still completes.
    pub fn pause(&mut self) -> bool {
        if !self.autoplay {
            return false;
        }
        self.autoplay = false;
        info!(index = self.index, "playback paused");
        true
    }

    /// Auto-play tick; only acts while playing and not animating.
    pub fn tick(&mut self) -> Option<AnimationTicket> {
        if self.mode() == ReplayMode::Playing {
            self.next()
        } else {
            None
        }
    }

    /// Jump to the move at `index`.
    pub fn jump_to(&mut self, index: usize) -> Result<Option<AnimationTicket>, ReplayError> {
        let total = self.game.as_ref().ok_or(ReplayError::NoGame)?.moves.len();
        if index >= total {
            return Err(ReplayError::MoveOutOfRange { index, total });
        }
        if self.is_animating() {
            debug!(index, "jump dropped while animating");
            return Ok(None);
        }
        // A jump always lands in Viewing.
        if self.pause() {
            debug!(index, "jump stopped playback");
        }
        if index as isize == self.index + 1 {
            return Ok(self.next());
        }

        self.index = index as isize;
        let mut steps = vec![Step::Reset {
            snapshot: index.checked_sub(1),
        }];
        steps.extend(self.move_steps(index));
        Ok(Some(self.start(steps)))
    }

    /// Run the next animation step. Returns how long to wait before the
    /// following step, or `None` once the animation is over or the ticket is stale.
    pub fn advance(&mut self, ticket: AnimationTicket) -> Option<Duration> {
        if ticket.0 != self.epoch {
            debug!("stale animation step ignored");
            return None;
        }
        let step = self.steps.pop_front()?;
        let wait = self.run_step(step);
        if self.steps.is_empty() {
            debug!(index = self.index, "animation finished");
            None
        } else {
            Some(wait)
        }
    }

    /// Run every remaining step without waiting.
    pub fn finish(&mut self, ticket: AnimationTicket) {
        while self.advance(ticket).is_some() {}
    }

    /// Drop the game and board. Pending animation steps become stale.
    pub fn destroy(&mut self) {
        self.cancel_pending();
        if self.game.take().is_some() {
            self.renderer.destroy();
            info!("replay destroyed");
        }
        self.index = -1;
        self.autoplay = false;
        self.engine.new_game();
    }

    pub fn flip(&mut self) {
        let flipped = !self.renderer.orientation();
        self.renderer.set_orientation(flipped);
    }

    /// The user picked up the piece on `square`; mark where it can go.
    pub fn on_move_start(&mut self, square: &str) -> bool {
        if self.game.is_none() || self.is_animating() {
            return false;
        }
        self.renderer.remove_markers(Some(MarkerStyle::Dot));
        let targets = self.engine.legal_destinations(square);
        for target in &targets {
            self.renderer.add_marker(target, MarkerStyle::Dot);
        }
        !targets.is_empty()
    }

    /// The user dropped a piece. Returns whether the move was legal.
    pub fn on_move_done(&mut self, from: &str, to: &str) -> bool {
        if self.game.is_none() || self.is_animating() {
            return false;
        }
        match self.engine.play_squares(from, to) {
            Some(outcome) => {
                self.renderer.remove_markers(Some(MarkerStyle::Dot));
                self.renderer.set_position(&outcome.position, false);
                true
            }
            None => false,
        }
    }

    pub fn on_move_canceled(&mut self) {
        self.renderer.remove_markers(Some(MarkerStyle::Dot));
    }

    fn cancel_pending(&mut self) {
        if !self.steps.is_empty() {
            debug!(pending = self.steps.len(), "cancelling animation");
        }
        self.steps.clear();
        self.epoch += 1;
    }

    fn start(&mut self, steps: Vec<Step>) -> AnimationTicket {
        self.steps = steps.into();
        self.epoch += 1;
        debug!(index = self.index, steps = self.steps.len(), "animation queued");
        AnimationTicket(self.epoch)
    }

    fn move_steps(&self, index: usize) -> Vec<Step> {
        let mut steps = vec![
            Step::Lift {
                index,
                color: Color::White,
            },
            Step::Land {
                index,
                color: Color::White,
            },
        ];
        let has_black = self
            .game
            .as_ref()
            .and_then(|g| g.moves.get(index))
            .is_some_and(|m| m.black_move.is_some());
        if has_black {
            steps.push(Step::Lift {
                index,
                color: Color::Black,
            });
            steps.push(Step::Land {
                index,
                color: Color::Black,
            });
        }
        steps
    }

    fn run_step(&mut self, step: Step) -> Duration {
        match step {
            Step::Reset { snapshot } => {
                let position = snapshot
                    .and_then(|i| self.game.as_ref()?.moves.get(i))
                    .map(|m| m.position_after().to_string())
                    .unwrap_or_else(|| START_FEN.to_string());
                self.renderer.remove_markers(None);
                self.renderer.set_position(&position, false);
                self.load_engine(&position);
                self.timings.move_time
            }
            Step::Lift { index, color } => {
                let Some(ply) = self.ply_view(index, color) else {
                    return Duration::ZERO;
                };
                if color == Color::White {
                    self.renderer.remove_markers(None);
                }
                self.load_engine(&ply.position);
                self.renderer
                    .add_marker(&ply.from_square, MarkerStyle::for_color(color));
                self.renderer.set_position(&ply.position, true);
                self.timings.animation
            }
            Step::Land { index, color } => {
                if let Some(square) = self.ply_view(index, color).and_then(|p| p.to_square) {
                    self.renderer.add_marker(&square, MarkerStyle::for_color(color));
                }
                self.timings
                    .black_move_delay
                    .saturating_sub(self.timings.animation)
            }
        }
    }

    fn ply_view(&self, index: usize, color: Color) -> Option<PlyView> {
        let mv = self.game.as_ref()?.moves.get(index)?;
        let (token, from, position) = match color {
            Color::White => (
                mv.white_move.as_str(),
                mv.white_move_from.as_str(),
                mv.white_position_after.as_str(),
            ),
            Color::Black => (
                mv.black_move.as_deref()?,
                mv.black_move_from.as_deref()?,
                mv.black_position_after.as_deref()?,
            ),
        };

        let back_rank = if color == Color::White { '1' } else { '8' };
        let (from_square, to_square) = if is_long_castling(token) {
            (format!("e{back_rank}"), Some(format!("c{back_rank}")))
        } else if is_castling(token) {
            (format!("e{back_rank}"), Some(format!("g{back_rank}")))
        } else {
            (from.to_string(), destination_square(token).map(str::to_string))
        };

        Some(PlyView {
            from_square,
            to_square,
            position: position.to_string(),
        })
    }

    fn load_engine(&mut self, position: &str) {
        if let Err(e) = self.engine.load(position) {
            warn!(error = %e, "could not load position into rules engine");
        }
    }
}
