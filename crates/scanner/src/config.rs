//! Scanner configuration from environment variables

use std::env;
use std::time::Duration;

use replay::ReplayTimings;
use tracing::info;

use crate::error::ScanError;

/// Which OCR text producer to use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OcrMode {
    /// HTTP OCR service at `OCR_READER_URL`.
    Remote,
    /// Local OCR worker process.
    Local,
}

#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub ocr_mode: OcrMode,

    /// Remote OCR endpoint (required in remote mode)
    pub ocr_reader_url: Option<String>,

    /// HTTP timeout for the remote OCR call
    pub ocr_timeout_secs: u64,

    /// Local OCR worker executable
    pub tesseract_path: String,

    pub ocr_language: String,

    pub playback_interval_ms: u64,
    pub move_time_ms: u64,
    pub black_move_delay_ms: u64,
    pub animation_ms: u64,
}

impl ScanConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ScanError> {
        let ocr_mode = match env::var("OCR_MODE").as_deref() {
            Ok("local") => OcrMode::Local,
            Ok("remote") | Err(_) => OcrMode::Remote,
            Ok(_) => return Err(ScanError::Config("OCR_MODE must be 'remote' or 'local'")),
        };

        // Checked when the remote producer is built, text imports never need it.
        let ocr_reader_url = env::var("OCR_READER_URL").ok().filter(|v| !v.is_empty());

        let config = Self {
            ocr_mode,
            ocr_reader_url,
            ocr_timeout_secs: parse_or("OCR_TIMEOUT_SECS", 60),
            tesseract_path: env::var("TESSERACT_PATH").unwrap_or_else(|_| "tesseract".to_string()),
            ocr_language: env::var("OCR_LANGUAGE").unwrap_or_else(|_| "eng".to_string()),
            playback_interval_ms: parse_or("PLAYBACK_INTERVAL_MS", 2800),
            move_time_ms: parse_or("MOVE_TIME_MS", 1200),
            black_move_delay_ms: parse_or("BLACK_MOVE_DELAY_MS", 1700),
            animation_ms: parse_or("ANIMATION_MS", 375),
        };

        info!(mode = ?config.ocr_mode, "scanner config loaded");
        Ok(config)
    }

    pub fn replay_timings(&self) -> ReplayTimings {
        ReplayTimings {
            playback_interval: Duration::from_millis(self.playback_interval_ms),
            move_time: Duration::from_millis(self.move_time_ms),
            black_move_delay: Duration::from_millis(self.black_move_delay_ms),
            animation: Duration::from_millis(self.animation_ms),
        }
    }
}

fn parse_or(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
