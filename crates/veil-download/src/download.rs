//! Download data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadState {
    /// Destination chosen, handed back to the renderer
    Accepted,
    /// No destination chosen
    Cancelled,
}

impl DownloadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadState::Accepted => "accepted",
            DownloadState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for DownloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A download the renderer wants to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOffer {
    pub url: String,
    /// File name proposed by the server or the URL, unsanitized
    pub suggested_name: String,
}

impl DownloadOffer {
    pub fn new(url: impl Into<String>, suggested_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            suggested_name: suggested_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Download {
    pub id: String,
    pub url: String,
    /// Sanitized file name
    pub file_name: String,
    /// Where the renderer should save it, `None` when cancelled
    pub path: Option<PathBuf>,
    pub state: DownloadState,
    pub created_at: DateTime<Utc>,
}

impl Download {
    /// Record the user's answer for an offer. No destination means cancelled.
    pub fn new(url: String, file_name: String, path: Option<PathBuf>) -> Self {
        let state = if path.is_some() {
            DownloadState::Accepted
        } else {
            DownloadState::Cancelled
        };

        Self {
            id: Uuid::new_v4().to_string(),
            url,
            file_name,
            path,
            state,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_follows_destination() {
        let accepted = Download::new(
            "https://example.com/file.zip".to_string(),
            "file.zip".to_string(),
            Some(PathBuf::from("/downloads/file.zip")),
        );
        assert_eq!(accepted.state, DownloadState::Accepted);
        assert_eq!(accepted.state.to_string(), "accepted");

        let cancelled = Download::new(
            "https://example.com/file.pdf".to_string(),
            "file.pdf".to_string(),
            None,
        );
        assert_eq!(cancelled.state, DownloadState::Cancelled);
        assert!(cancelled.path.is_none());
        assert_ne!(accepted.id, cancelled.id);
    }
}
