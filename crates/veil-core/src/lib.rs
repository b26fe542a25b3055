//! Veil Core
//!
//! Central coordination layer for the Veil browser. Wires the session,
//! navigation, privacy, storage and download crates together behind
//! [`Browser`], and owns configuration and logging setup.

mod browser;
mod config;
mod error;

pub use browser::Browser;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use veil_download::{DestinationChooser, Download, DownloadOffer, DownloadState};
pub use veil_navigation::{NavigationError, ResolvedAction};
pub use veil_privacy::{ProxyConfigurator, ProxyEndpoint, ProxyKind, RouteDecision};
pub use veil_session::{SessionError, SessionEvent};
pub use veil_storage::{AddBookmark, Bookmark, HistoryEntry, StorageError, UpdateBookmark};
pub use veil_tabs::{Renderer, RendererEvent, TabContext, TabError, TabState, ViewId};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
