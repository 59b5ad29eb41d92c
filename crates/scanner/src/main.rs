use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use notation_core::{material_score, GameInfo};
use replay::{ReplayCommand, ReplayController, ReplayDriver, ReplayMode};
use scanner::bookmarks::{Bookmarks, MemoryBookmarkStore, SavedGames};
use scanner::config::ScanConfig;
use scanner::ocr::{producer_from_config, OCR_FAILURE_NOTICE};
use scanner::recovery::{ImportSession, SharedSession};
use scanner::service::ScanService;
use scanner::terminal::{LoggingBoard, TerminalEditor};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Import handwritten or printed chess notation and replay it.
///
/// ```bash
/// # Import notation text from a file
/// chess-scan text game.txt
///
/// # OCR one or more scoresheet photos, then auto-play the game
/// chess-scan --play scan page1.png page2.png
///
/// # Print the game as a saved-games document under bookmark "club"
/// chess-scan --save "club/round 3" text game.txt
/// ```
#[derive(Parser)]
#[command(name = "chess-scan")]
#[command(about = "Turn scanned chess notation into a validated, replayable game")]
#[command(version = "0.1.0")]
struct Args {
    /// Auto-play the imported game instead of jumping to the final position
    #[arg(long, global = true)]
    play: bool,

    /// Print the imported game as a saved-games JSON document, filed under BOOKMARK/TITLE
    #[arg(long, global = true, value_name = "BOOKMARK/TITLE")]
    save: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import notation text from a file
    Text {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Recognize notation from images with the configured OCR producer
    Scan {
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = ScanConfig::from_env()?;
    let session = SharedSession::new(ImportSession::new());
    let mut editor = TerminalEditor::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());

    let game = match args.command {
        Command::Text { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            session.run(&text, &mut editor).await
        }
        Command::Scan { images } => {
            let mut encoded = Vec::with_capacity(images.len());
            for path in &images {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                encoded.push(STANDARD.encode(bytes));
            }

            let producer = Arc::from(producer_from_config(&config)?);
            let service = ScanService::new(producer, session.clone());

            let cancel = CancellationToken::new();
            tokio::spawn({
                let cancel = cancel.clone();
                async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        cancel.cancel();
                    }
                }
            });

            match service.scan(encoded, &cancel).await {
                Ok(Some(outcome)) => session.resolve(outcome, &mut editor).await,
                Ok(None) => None,
                Err(e) => {
                    eprintln!("{OCR_FAILURE_NOTICE}");
                    return Err(e.into());
                }
            }
        }
    };

    let Some(game) = game else {
        println!("No game imported.");
        return Ok(());
    };

    print_game(&game);
    if let Some(target) = &args.save {
        print_saved(&game, target)?;
    }
    replay_game(game, &config, args.play).await
}

fn print_game(game: &GameInfo) {
    println!("{}", game.to_movetext());
    for (i, mv) in game.moves.iter().enumerate() {
        let black = mv.black_move.as_deref().unwrap_or("");
        println!(
            "{:>3}. {:<8} {:<8} white took {:?}, black took {:?}",
            i + 1,
            mv.white_move,
            black,
            mv.white_captured,
            mv.black_captured
        );
    }
    if let Some(last) = game.moves.last() {
        let (white, black) = material_score(&last.white_captured, &last.black_captured);
        println!("Material: white {white:+}, black {black:+}");
    }
}

fn print_saved(game: &GameInfo, target: &str) -> anyhow::Result<()> {
    let saved = saved_document(game, target)?;
    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}

/// File `game` under `BOOKMARK/TITLE` in a fresh saved-games document.
fn saved_document(game: &GameInfo, target: &str) -> anyhow::Result<SavedGames> {
    let (bookmark, title) = target
        .split_once('/')
        .filter(|(b, t)| !b.is_empty() && !t.is_empty())
        .context("--save expects BOOKMARK/TITLE")?;

    let mut bookmarks = Bookmarks::new(MemoryBookmarkStore::new());
    bookmarks.create_bookmark(bookmark)?;
    Ok(bookmarks.save_game(bookmark, title, game)?)
}

async fn replay_game(game: GameInfo, config: &ScanConfig, play: bool) -> anyhow::Result<()> {
    let last = game.total_moves.saturating_sub(1);
    let controller = ReplayController::new(LoggingBoard::new(), config.replay_timings());
    let (driver, mut handle) = ReplayDriver::new(controller);
    let task = tokio::spawn(driver.run());

    handle
        .send(ReplayCommand::Load {
            game,
            editable: false,
        })
        .await?;
    let command = if play {
        ReplayCommand::Play
    } else {
        ReplayCommand::JumpTo(last)
    };
    handle.send(command).await?;

    let target = last as isize;
    handle
        .wait_for(|s| s.mode == ReplayMode::Viewing && s.current_move_index == target)
        .await?;

    handle.shutdown();
    let controller = task.await?;
    println!("Final position: {}", controller.renderer().position());
    Ok(())
}
