//! Replay of a validated game: navigation state machine, board renderer seam
//! and the async driver that paces animations and auto-play.

pub mod board;
pub mod controller;
pub mod driver;
pub mod error;

pub use board::{BoardRenderer, MarkerStyle};
pub use controller::{AnimationTicket, ReplayController, ReplayMode, ReplayState, ReplayTimings};
pub use driver::{ReplayCommand, ReplayDriver, ReplayHandle};
pub use error::ReplayError;
