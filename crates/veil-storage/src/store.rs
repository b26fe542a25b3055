//! Bookmark and history store
//!
//! Both collections are cached in memory and written through to their JSON
//! files on every mutation.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StorageError;
use crate::file::JsonFile;
use crate::Result;

pub const BOOKMARKS_FILE: &str = "bookmarks.json";
pub const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    pub url: String,
}

impl Bookmark {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// A visited URL. Stored as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryEntry {
    pub url: String,
}

impl HistoryEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddBookmark {
    Added,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateBookmark {
    Updated,
    AlreadyExists,
}

pub struct Store {
    bookmarks_file: Arc<JsonFile<Vec<Bookmark>>>,
    history_file: Arc<JsonFile<Vec<HistoryEntry>>>,
    bookmarks: Arc<RwLock<Vec<Bookmark>>>,
    history: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl Store {
    pub fn new(bookmarks_path: impl Into<PathBuf>, history_path: impl Into<PathBuf>) -> Self {
        Self {
            bookmarks_file: Arc::new(JsonFile::new(bookmarks_path)),
            history_file: Arc::new(JsonFile::new(history_path)),
            bookmarks: Arc::new(RwLock::new(Vec::new())),
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Store using the default file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(BOOKMARKS_FILE), dir.join(HISTORY_FILE))
    }

    /// Load both collections into memory.
    ///
    /// A collection that cannot be read falls back to empty. Corrupt files
    /// are renamed aside so that later saves do not destroy them. The
    /// failures are returned so the caller can tell the user.
    pub fn restore(&self) -> Vec<StorageError> {
        let mut problems = Vec::new();

        if let Err(e) = self.load_bookmarks() {
            Self::recover(&self.bookmarks_file, &e);
            self.bookmarks.write().clear();
            problems.push(e);
        }

        if let Err(e) = self.load_history() {
            Self::recover(&self.history_file, &e);
            self.history.write().clear();
            problems.push(e);
        }

        tracing::info!(
            bookmarks = self.bookmarks.read().len(),
            history = self.history.read().len(),
            problems = problems.len(),
            "Restored store"
        );

        problems
    }

    fn recover<T>(file: &JsonFile<T>, error: &StorageError)
    where
        T: Serialize + serde::de::DeserializeOwned,
    {
        tracing::warn!(path = %file.path().display(), error = %error, "Store file unreadable, starting empty");

        if error.is_corrupt() {
            match file.quarantine() {
                Ok(moved) => {
                    tracing::warn!(moved_to = %moved.display(), "Moved corrupt store file aside")
                }
                Err(e) => tracing::error!(error = %e, "Failed to move corrupt store file"),
            }
        }
    }

    // === Bookmarks ===

    pub fn load_bookmarks(&self) -> Result<Vec<Bookmark>> {
        let bookmarks = self.bookmarks_file.load()?.unwrap_or_default();
        *self.bookmarks.write() = bookmarks.clone();
        Ok(bookmarks)
    }

    pub fn save_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<()> {
        let mut cache = self.bookmarks.write();
        let bookmarks = bookmarks.to_vec();
        self.bookmarks_file.save(&bookmarks)?;
        *cache = bookmarks;
        Ok(())
    }

    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.bookmarks.read().clone()
    }

    /// Insert a bookmark unless the identical `(title, url)` pair exists
    pub fn add_bookmark(&self, title: &str, url: &str) -> Result<AddBookmark> {
        let bookmark = validated_bookmark(title, url)?;

        let mut cache = self.bookmarks.write();
        if cache.contains(&bookmark) {
            tracing::info!(title = %bookmark.title, url = %bookmark.url, "Bookmark already exists");
            return Ok(AddBookmark::AlreadyExists);
        }

        let mut updated = cache.clone();
        updated.push(bookmark);
        self.bookmarks_file.save(&updated)?;
        *cache = updated;

        tracing::info!(title = %title, url = %url, "Added bookmark");

        Ok(AddBookmark::Added)
    }

    pub fn update_bookmark(&self, index: usize, title: &str, url: &str) -> Result<UpdateBookmark> {
        let bookmark = validated_bookmark(title, url)?;

        let mut cache = self.bookmarks.write();
        if index >= cache.len() {
            return Err(StorageError::BookmarkNotFound(index));
        }

        if cache
            .iter()
            .enumerate()
            .any(|(i, existing)| i != index && *existing == bookmark)
        {
            return Ok(UpdateBookmark::AlreadyExists);
        }

        let mut updated = cache.clone();
        updated[index] = bookmark;
        self.bookmarks_file.save(&updated)?;
        *cache = updated;

        tracing::info!(index, title = %title, url = %url, "Updated bookmark");

        Ok(UpdateBookmark::Updated)
    }

    pub fn remove_bookmark(&self, index: usize) -> Result<Bookmark> {
        let mut cache = self.bookmarks.write();
        if index >= cache.len() {
            return Err(StorageError::BookmarkNotFound(index));
        }

        let mut updated = cache.clone();
        let removed = updated.remove(index);
        self.bookmarks_file.save(&updated)?;
        *cache = updated;

        tracing::info!(index, url = %removed.url, "Removed bookmark");

        Ok(removed)
    }

    // === History ===

    pub fn load_history(&self) -> Result<Vec<HistoryEntry>> {
        let history = self.history_file.load()?.unwrap_or_default();
        *self.history.write() = history.clone();
        Ok(history)
    }

    pub fn save_history(&self, history: &[HistoryEntry]) -> Result<()> {
        let mut cache = self.history.write();
        let history = history.to_vec();
        self.history_file.save(&history)?;
        *cache = history;
        Ok(())
    }

    /// History in visit order, oldest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.read().clone()
    }

    pub fn append_history(&self, url: &str) -> Result<()> {
        let mut cache = self.history.write();
        let mut updated = cache.clone();
        updated.push(HistoryEntry::new(url));
        self.history_file.save(&updated)?;
        *cache = updated;

        tracing::debug!(url = %url, "Appended history entry");

        Ok(())
    }

    pub fn clear_history(&self) -> Result<()> {
        let mut cache = self.history.write();
        self.history_file.save(&Vec::new())?;
        cache.clear();

        tracing::info!("Cleared history");

        Ok(())
    }
}

fn validated_bookmark(title: &str, url: &str) -> Result<Bookmark> {
    if title.trim().is_empty() {
        return Err(StorageError::InvalidBookmark(
            "Bookmark title cannot be empty".to_string(),
        ));
    }
    if url.trim().is_empty() {
        return Err(StorageError::InvalidBookmark(
            "Bookmark URL cannot be empty".to_string(),
        ));
    }
    Ok(Bookmark::new(title, url))
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            bookmarks_file: Arc::clone(&self.bookmarks_file),
            history_file: Arc::clone(&self.history_file),
            bookmarks: Arc::clone(&self.bookmarks),
            history: Arc::clone(&self.history),
        }
    }
}
