//! The correction loop: run notation text through the import pipeline and
//! hand failures back to an editor until a game is accepted or abandoned.

use std::sync::Arc;

use async_trait::async_trait;
use notation_core::{
    build_game_history_with, normalize, pair_plies, read_pairs, GameInfo, MovePair,
    NotationError, RulesEngine, ShakmatyEngine,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Text could not be split into move pairs.
    Parse,
    /// No move pairs were found.
    Empty,
    /// Tokens failed the notation grammar.
    Syntax,
    /// The rules engine rejected a move.
    Illegal,
}

/// What the editor is shown when a pass fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionRequest {
    /// Normalized text of the failed submission.
    pub notation: String,
    /// Offending tokens, if any are known.
    pub errors: Vec<String>,
    pub kind: FailureKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(GameInfo),
    NeedsCorrection(CorrectionRequest),
}

/// Supplies corrected notation text. `None` means the user gave up.
#[async_trait]
pub trait NotationEditor: Send {
    async fn correct(&mut self, request: &CorrectionRequest) -> Option<String>;
}

/// Holds the accepted game and merges new notation into it.
pub struct ImportSession<E = ShakmatyEngine> {
    engine: E,
    accepted: Option<GameInfo>,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::with_engine(ShakmatyEngine::new())
    }
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RulesEngine> ImportSession<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            accepted: None,
        }
    }

    pub fn game(&self) -> Option<&GameInfo> {
        self.accepted.as_ref()
    }

    /// Drop the accepted game and start over.
    pub fn clear(&mut self) {
        self.accepted = None;
    }

    /// Replace the accepted game, e.g. with a saved one. The game is rebuilt
    /// from its moves so a tampered or stale record is never accepted as is.
    pub fn open(&mut self, game: &GameInfo) -> Result<GameInfo, NotationError> {
        let rebuilt = build_game_history_with(&mut self.engine, &game.to_pairs())?;
        if rebuilt != *game {
            debug!("opened game differs from its replay, using the replay");
        }
        self.accepted = Some(rebuilt.clone());
        Ok(rebuilt)
    }

    /// One pipeline pass. New plies continue the accepted game in turn order
    /// and the whole list is replayed; a failure leaves the accepted game as is.
    pub fn submit(&mut self, text: &str) -> Outcome {
        let notation = normalize(text);

        let pairs = match read_pairs(&notation) {
            Ok(pairs) if pairs.is_empty() => {
                return needs_correction(notation, Vec::new(), FailureKind::Empty)
            }
            Ok(pairs) => pairs,
            Err(e) => {
                let kind = match e {
                    NotationError::SyntacticInvalid { .. } => FailureKind::Syntax,
                    _ => FailureKind::Parse,
                };
                warn!(error = %e, "notation rejected");
                return needs_correction(notation, e.offending_tokens(), kind);
            }
        };

        let accepted = self
            .accepted
            .as_ref()
            .map(GameInfo::to_pairs)
            .unwrap_or_default();
        let new_plies: usize = pairs.iter().map(|p| p.tokens().count()).sum();
        let merged = pair_plies(accepted.iter().chain(&pairs).flat_map(MovePair::tokens));

        match build_game_history_with(&mut self.engine, &merged) {
            Ok(game) => {
                info!(new_plies, total_moves = game.total_moves, "game accepted");
                self.accepted = Some(game.clone());
                Outcome::Accepted(game)
            }
            Err(e) => {
                warn!(error = %e, "move list failed replay");
                needs_correction(notation, e.offending_tokens(), FailureKind::Illegal)
            }
        }
    }

    /// Keep asking `editor` for corrections until the outcome is accepted.
    /// Returns `None` if the editor abandons.
    pub async fn resolve<N: NotationEditor + ?Sized>(
        &mut self,
        mut outcome: Outcome,
        editor: &mut N,
    ) -> Option<GameInfo> {
        loop {
            match outcome {
                Outcome::Accepted(game) => return Some(game),
                Outcome::NeedsCorrection(request) => {
                    let Some(corrected) = editor.correct(&request).await else {
                        debug!("correction abandoned");
                        return None;
                    };
                    outcome = self.submit(&corrected);
                }
            }
        }
    }

    /// Submit `text`, then correct it through `editor` as needed.
    pub async fn run<N: NotationEditor + ?Sized>(
        &mut self,
        text: &str,
        editor: &mut N,
    ) -> Option<GameInfo> {
        let outcome = self.submit(text);
        self.resolve(outcome, editor).await
    }
}

fn needs_correction(notation: String, errors: Vec<String>, kind: FailureKind) -> Outcome {
    Outcome::NeedsCorrection(CorrectionRequest {
        notation,
        errors,
        kind,
    })
}

/// [`ImportSession`] shared between tasks. At most one submission runs at a time.
pub struct SharedSession<E = ShakmatyEngine> {
    inner: Arc<Mutex<ImportSession<E>>>,
}

impl<E> Clone for SharedSession<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: RulesEngine> SharedSession<E> {
    pub fn new(session: ImportSession<E>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn submit(&self, text: &str) -> Outcome {
        self.inner.lock().await.submit(text)
    }

    /// Holds the session for the whole correction loop.
    pub async fn resolve<N: NotationEditor + ?Sized>(
        &self,
        outcome: Outcome,
        editor: &mut N,
    ) -> Option<GameInfo> {
        self.inner.lock().await.resolve(outcome, editor).await
    }

    pub async fn run<N: NotationEditor + ?Sized>(
        &self,
        text: &str,
        editor: &mut N,
    ) -> Option<GameInfo> {
        self.inner.lock().await.run(text, editor).await
    }

    pub async fn game(&self) -> Option<GameInfo> {
        self.inner.lock().await.game().cloned()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn open(&self, game: &GameInfo) -> Result<GameInfo, NotationError> {
        self.inner.lock().await.open(game)
    }
}
