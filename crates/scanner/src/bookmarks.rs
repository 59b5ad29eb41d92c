//! Named bookmarks of saved games, kept as a single JSON document.

use notation_core::GameInfo;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ScanError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub title: String,
    pub game: GameInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games: Option<Vec<SavedGame>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGames {
    pub bookmarks: Vec<Bookmark>,
}

/// Raw storage for the saved-games document.
pub trait BookmarkStore {
    /// Stored document, `None` if nothing has been written yet.
    fn read(&self) -> Option<String>;

    fn write(&mut self, document: String) -> Result<(), ScanError>;
}

/// In-memory store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryBookmarkStore {
    document: Option<String>,
}

impl MemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing raw document.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
        }
    }
}

impl BookmarkStore for MemoryBookmarkStore {
    fn read(&self) -> Option<String> {
        self.document.clone()
    }

    fn write(&mut self, document: String) -> Result<(), ScanError> {
        self.document = Some(document);
        Ok(())
    }
}

/// Bookmark operations over a [`BookmarkStore`].
pub struct Bookmarks<S> {
    store: S,
}

impl<S: BookmarkStore> Bookmarks<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current document. `None` signals a corrupt store.
    pub fn saved_games(&self) -> Option<SavedGames> {
        let Some(raw) = self.store.read() else {
            return Some(SavedGames::default());
        };
        match serde_json::from_str(&raw) {
            Ok(saved) => Some(saved),
            Err(e) => {
                warn!(error = %e, "saved games document is corrupt");
                None
            }
        }
    }

    /// Document to mutate. A corrupt document is replaced by an empty one.
    fn load_for_update(&mut self) -> Result<SavedGames, ScanError> {
        match self.saved_games() {
            Some(saved) => Ok(saved),
            None => {
                let fresh = SavedGames::default();
                self.persist(&fresh)?;
                Ok(fresh)
            }
        }
    }

    fn persist(&mut self, saved: &SavedGames) -> Result<(), ScanError> {
        self.store.write(serde_json::to_string(saved)?)
    }

    /// Add an empty bookmark in front of the existing ones.
    pub fn create_bookmark(&mut self, name: &str) -> Result<SavedGames, ScanError> {
        let mut saved = self.load_for_update()?;
        saved.bookmarks.insert(
            0,
            Bookmark {
                name: name.to_string(),
                games: None,
            },
        );
        self.persist(&saved)?;
        debug!(bookmark = name, "bookmark created");
        Ok(saved)
    }

    pub fn delete_bookmark(&mut self, name: &str) -> Result<SavedGames, ScanError> {
        let mut saved = self.load_for_update()?;
        saved.bookmarks.retain(|b| b.name != name);
        self.persist(&saved)?;
        Ok(saved)
    }

    /// Remove every game called `title` from `bookmark`.
    pub fn delete_game(&mut self, bookmark: &str, title: &str) -> Result<SavedGames, ScanError> {
        let mut saved = self.load_for_update()?;
        for entry in saved.bookmarks.iter_mut().filter(|b| b.name == bookmark) {
            let mut games = entry.games.take().unwrap_or_default();
            games.retain(|g| g.title != title);
            entry.games = Some(games);
        }
        self.persist(&saved)?;
        Ok(saved)
    }

    /// Append `game` to `bookmark`. Unknown bookmarks are left untouched.
    pub fn save_game(
        &mut self,
        bookmark: &str,
        title: &str,
        game: &GameInfo,
    ) -> Result<SavedGames, ScanError> {
        let mut saved = self.load_for_update()?;
        for entry in saved.bookmarks.iter_mut().filter(|b| b.name == bookmark) {
            entry.games.get_or_insert_with(Vec::new).push(SavedGame {
                title: title.to_string(),
                game: game.clone(),
            });
        }
        self.persist(&saved)?;
        debug!(bookmark, title, "game saved");
        Ok(saved)
    }
}
