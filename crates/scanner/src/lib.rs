//! Notation scanning: OCR text producers, the correction loop that turns
//! their output into an accepted game, and saved-game bookmarks.

pub mod bookmarks;
pub mod config;
pub mod error;
pub mod ocr;
pub mod recovery;
pub mod service;
pub mod terminal;
