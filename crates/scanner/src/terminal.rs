//! Terminal collaborators for the CLI: a line editor for corrections and a
//! board renderer that logs instead of drawing.

use async_trait::async_trait;
use replay::{BoardRenderer, MarkerStyle};
use shakmaty::Color;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::recovery::{CorrectionRequest, FailureKind, NotationEditor};

/// Prints the failed notation and reads one corrected line.
/// An empty line or end of input abandons.
pub struct TerminalEditor<R, W> {
    input: R,
    output: W,
}

impl<R, W> TerminalEditor<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

fn describe(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Parse => "Could not parse the notation.",
        FailureKind::Empty => "No moves found. Moves must be numbered, e.g. 1. e4 e5 2. Nf3",
        FailureKind::Syntax => "Some moves are not valid notation:",
        FailureKind::Illegal => "This move is not legal in the game:",
    }
}

impl<R, W> TerminalEditor<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn prompt(&mut self, request: &CorrectionRequest) -> std::io::Result<Option<String>> {
        let mut message = format!("{}\n", describe(request.kind));
        if !request.errors.is_empty() {
            message.push_str(&format!("  {}\n", request.errors.join(" ")));
        }
        message.push_str(&format!("Notation: {}\n", request.notation));
        message.push_str("Corrected notation (empty line to give up): ");
        self.output.write_all(message.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        self.input.read_line(&mut line).await?;
        let line = line.trim();
        Ok((!line.is_empty()).then(|| line.to_string()))
    }
}

#[async_trait]
impl<R, W> NotationEditor for TerminalEditor<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn correct(&mut self, request: &CorrectionRequest) -> Option<String> {
        match self.prompt(request).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "terminal editor failed");
                None
            }
        }
    }
}

/// Renderer that reports board changes through tracing.
pub struct LoggingBoard {
    orientation: Color,
    position: String,
}

impl LoggingBoard {
    pub fn new() -> Self {
        Self {
            orientation: Color::White,
            position: String::new(),
        }
    }

    /// Last position set on the board.
    pub fn position(&self) -> &str {
        &self.position
    }
}

impl Default for LoggingBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardRenderer for LoggingBoard {
    fn render(&mut self, editable: bool) {
        debug!(editable, "board rendered");
    }

    fn set_position(&mut self, position: &str, animate: bool) {
        info!(animate, "{position}");
        self.position = position.to_string();
    }

    fn add_marker(&mut self, square: &str, style: MarkerStyle) {
        debug!(square, ?style, "marker");
    }

    fn remove_markers(&mut self, style: Option<MarkerStyle>) {
        debug!(?style, "markers cleared");
    }

    fn orientation(&self) -> Color {
        self.orientation
    }

    fn set_orientation(&mut self, color: Color) {
        self.orientation = color;
    }

    fn destroy(&mut self) {
        debug!("board destroyed");
    }
}
