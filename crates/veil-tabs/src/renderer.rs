//! Page renderer interface
//!
//! Implemented by the host's web engine integration. Views are owned by the
//! renderer; tabs only hold their [`ViewId`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(pub u64);

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

pub trait Renderer: Send + Sync {
    fn create_view(&self) -> ViewId;
    fn navigate(&self, view: ViewId, url: &str);
    fn back(&self, view: ViewId);
    fn forward(&self, view: ViewId);
    fn reload(&self, view: ViewId);
    fn current_url(&self, view: ViewId) -> Option<String>;
    /// The view will not be used again
    fn release(&self, view: ViewId);
}

/// Notifications the renderer sends for one of its views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererEvent {
    NavigationStarted,
    UrlChanged(String),
    TitleChanged(String),
    /// `false` for network or HTTP failures
    LoadFinished(bool),
}
