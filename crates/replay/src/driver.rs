//! Async driver for a [`ReplayController`].
//!
//! One task owns the controller and serializes everything that can touch it:
//! commands from the handle, animation step timers and the auto-play tick.

use notation_core::{GameInfo, RulesEngine, ShakmatyEngine};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::board::BoardRenderer;
use crate::controller::{AnimationTicket, ReplayController, ReplayState};
use crate::error::ReplayError;

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone)]
pub enum ReplayCommand {
    Load { game: GameInfo, editable: bool },
    Next,
    Prev,
    Play,
    Pause,
    JumpTo(usize),
    Flip,
    Destroy,
}

impl ReplayCommand {
    fn name(&self) -> &'static str {
        match self {
            ReplayCommand::Load { .. } => "load",
            ReplayCommand::Next => "next",
            ReplayCommand::Prev => "prev",
            ReplayCommand::Play => "play",
            ReplayCommand::Pause => "pause",
            ReplayCommand::JumpTo(_) => "jump_to",
            ReplayCommand::Flip => "flip",
            ReplayCommand::Destroy => "destroy",
        }
    }
}

/// Cloneable handle for talking to a running [`ReplayDriver`].
#[derive(Clone)]
pub struct ReplayHandle {
    commands: mpsc::Sender<ReplayCommand>,
    state: watch::Receiver<ReplayState>,
    cancel: CancellationToken,
}

impl ReplayHandle {
    pub async fn send(&self, command: ReplayCommand) -> Result<(), ReplayError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ReplayError::DriverStopped)
    }

    /// Latest published state.
    pub fn state(&self) -> ReplayState {
        *self.state.borrow()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&ReplayState) -> bool,
    ) -> Result<ReplayState, ReplayError> {
        self.state
            .wait_for(predicate)
            .await
            .map(|state| *state)
            .map_err(|_| ReplayError::DriverStopped)
    }

    /// Stop the driver. The controller is destroyed before `run` returns.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

pub struct ReplayDriver<R, E = ShakmatyEngine> {
    controller: ReplayController<R, E>,
    commands: mpsc::Receiver<ReplayCommand>,
    state: watch::Sender<ReplayState>,
    cancel: CancellationToken,
}

impl<R: BoardRenderer, E: RulesEngine> ReplayDriver<R, E> {
    pub fn new(controller: ReplayController<R, E>) -> (Self, ReplayHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state_rx) = watch::channel(controller.state());
        let cancel = CancellationToken::new();

        let driver = Self {
            controller,
            commands: command_rx,
            state: state_tx,
            cancel: cancel.clone(),
        };
        let handle = ReplayHandle {
            commands: command_tx,
            state: state_rx,
            cancel,
        };
        (driver, handle)
    }

    /// Run until the handle shuts the driver down or every handle is dropped.
    /// Returns the controller for inspection.
    pub async fn run(mut self) -> ReplayController<R, E> {
        let period = self.controller.timings().playback_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut pending: Option<(Instant, AnimationTicket)> = None;
        let mut was_playing = false;

        loop {
            let playing = self.controller.is_auto_playing();
            if playing && !was_playing {
                ticker.reset();
            }
            was_playing = playing;
            let deadline = pending.map(|(at, _)| at);

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("replay driver cancelled");
                    self.controller.destroy();
                    break;
                }
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("all replay handles dropped");
                        break;
                    };
                    let clears_timers = matches!(
                        command,
                        ReplayCommand::Load { .. } | ReplayCommand::Destroy
                    );
                    if let Some(ticket) = self.dispatch(command) {
                        pending = Some((Instant::now(), ticket));
                    } else if clears_timers {
                        pending = None;
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some((_, ticket)) = pending.take() {
                        if let Some(wait) = self.controller.advance(ticket) {
                            pending = Some((Instant::now() + wait, ticket));
                        }
                    }
                }
                _ = ticker.tick(), if playing => {
                    if let Some(ticket) = self.controller.tick() {
                        pending = Some((Instant::now(), ticket));
                    }
                }
            }

            self.publish();
        }

        self.publish();
        self.controller
    }

    fn dispatch(&mut self, command: ReplayCommand) -> Option<AnimationTicket> {
        debug!(command = command.name(), "replay command");
        match command {
            ReplayCommand::Load { game, editable } => {
                self.controller.load(game, editable);
                None
            }
            ReplayCommand::Next => self.controller.next(),
            ReplayCommand::Prev => self.controller.prev(),
            ReplayCommand::Play => self.controller.play(),
            ReplayCommand::Pause => {
                self.controller.pause();
                None
            }
            ReplayCommand::JumpTo(index) => match self.controller.jump_to(index) {
                Ok(ticket) => ticket,
                Err(e) => {
                    warn!(error = %e, "jump rejected");
                    None
                }
            },
            ReplayCommand::Flip => {
                self.controller.flip();
                None
            }
            ReplayCommand::Destroy => {
                self.controller.destroy();
                None
            }
        }
    }

    fn publish(&self) {
        self.state.send_replace(self.controller.state());
    }
}
