//! Browser configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use veil_navigation::DEFAULT_SEARCH_ENGINE;
use veil_privacy::{ProxyEndpoint, DEFAULT_BLOCKED_DOMAINS};
use veil_storage::{BOOKMARKS_FILE, HISTORY_FILE};

use crate::Result;

pub const DEFAULT_HOMEPAGE: &str = "https://duckduckgo.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the bookmark and history files
    pub data_dir: PathBuf,
    /// Overrides `<data_dir>/bookmarks.json`
    pub bookmarks_path: Option<PathBuf>,
    /// Overrides `<data_dir>/history.json`
    pub history_path: Option<PathBuf>,
    /// Default download directory
    pub download_dir: PathBuf,
    /// Homepage URL, also loaded by new tabs
    pub homepage: String,
    /// Search engine URL template
    pub search_engine: String,
    /// Block requests to known ad hosts
    pub ad_blocking: bool,
    pub blocked_domains: Vec<String>,
    /// SOCKS5 endpoint for `.onion` hosts
    pub onion_proxy: ProxyEndpoint,
    /// Do not record history
    pub incognito: bool,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        let download_dir = dirs::download_dir().unwrap_or_else(|| data_dir.join("Downloads"));

        Self {
            data_dir,
            bookmarks_path: None,
            history_path: None,
            download_dir,
            homepage: DEFAULT_HOMEPAGE.to_string(),
            search_engine: DEFAULT_SEARCH_ENGINE.to_string(),
            ad_blocking: true,
            blocked_domains: DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            onion_proxy: ProxyEndpoint::default(),
            incognito: false,
        }
    }

    /// Read settings from a JSON file. Missing file or fields fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;

        tracing::info!(path = %path.display(), "Loaded settings");

        Ok(config)
    }

    pub fn bookmarks_path(&self) -> PathBuf {
        self.bookmarks_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(BOOKMARKS_FILE))
    }

    pub fn history_path(&self) -> PathBuf {
        self.history_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(HISTORY_FILE))
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Veil"))
            .unwrap_or_else(|| PathBuf::from(".veil"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Platform directories from the usual environment variables
mod dirs {
    use std::path::PathBuf;

    fn home() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("USERPROFILE").ok().map(PathBuf::from)
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var("HOME").ok().map(PathBuf::from)
        }
    }

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            home().map(|h| h.join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| home().map(|h| h.join(".local/share")))
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }

    pub fn download_dir() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DOWNLOAD_DIR")
                .ok()
                .map(PathBuf::from)
                .or_else(|| home().map(|h| h.join("Downloads")))
        }
        #[cfg(not(target_os = "linux"))]
        {
            home().map(|h| h.join("Downloads"))
        }
    }
}
