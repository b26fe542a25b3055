//! Veil Storage Layer
//!
//! JSON-file persistence for bookmarks and history.
//! Every write replaces its file atomically (temp file + rename).

mod error;
mod file;
mod store;

pub use error::StorageError;
pub use file::JsonFile;
pub use store::{
    AddBookmark, Bookmark, HistoryEntry, Store, UpdateBookmark, BOOKMARKS_FILE, HISTORY_FILE,
};

pub type Result<T> = std::result::Result<T, StorageError>;
