//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] veil_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] veil_session::SessionError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] veil_navigation::NavigationError),

    #[error("Download error: {0}")]
    Download(#[from] veil_download::DownloadError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History entry not found: {0}")]
    HistoryEntryNotFound(usize),
}
