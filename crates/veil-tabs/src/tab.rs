//! Tab data structure

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::TabError;
use crate::renderer::ViewId;
use crate::state::TabState;
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct TabContext {
    /// Unique identifier
    pub id: String,
    /// Renderer view showing this tab
    pub view: ViewId,
    /// Last successfully loaded URL
    pub url: String,
    /// Destination of the load in flight, if any
    pub pending_url: Option<String>,
    /// The committed page was loaded through the onion proxy
    pub proxied: bool,
    /// Proxy decision for the load in flight, if it was a resolved navigation
    pub pending_proxied: Option<bool>,
    /// Label given when the tab was opened
    pub label: String,
    /// Page title reported by the renderer
    pub title: String,
    /// Current state in the state machine
    pub state: TabState,
    /// When the tab was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl TabContext {
    pub fn new(view: ViewId, label: String) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            view,
            url: String::new(),
            pending_url: None,
            proxied: false,
            pending_proxied: None,
            label,
            title: String::new(),
            state: TabState::Created,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attempt to transition to a new state
    pub fn transition_to(&mut self, new_state: TabState) -> Result<()> {
        if !self.state.can_transition_to(new_state) {
            return Err(TabError::InvalidTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            });
        }

        tracing::debug!(
            tab_id = %self.id,
            from = %self.state,
            to = %new_state,
            "Tab state transition"
        );

        self.state = new_state;
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Start loading `url`, replacing any load already in flight.
    /// `via_proxy` is the routing decision made for it.
    pub fn begin_navigation(&mut self, url: String, via_proxy: bool) -> Result<()> {
        if url.is_empty() {
            return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
        }

        self.transition_to(TabState::Loading)?;
        self.pending_url = Some(url);
        self.pending_proxied = Some(via_proxy);

        Ok(())
    }

    /// Start a load whose destination the renderer decides (back, forward, reload).
    /// The committed page's routing carries over.
    pub fn begin_history_load(&mut self) -> Result<()> {
        self.transition_to(TabState::Loading)?;
        self.pending_url = None;
        self.pending_proxied = None;
        Ok(())
    }

    /// Renderer reported a URL for this tab
    pub fn observe_url(&mut self, url: String) {
        if self.state == TabState::Loaded {
            // In-page navigation, nothing to wait for
            self.url = url;
        } else {
            self.pending_url = Some(url);
        }
        self.updated_at = Utc::now();
    }

    /// Update page title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    /// Complete the load in flight.
    ///
    /// On success the pending URL (or `fallback_url` when none was observed)
    /// becomes the tab's URL and is returned. On failure the pending URL is
    /// dropped and the last good URL kept.
    pub fn finish_load(&mut self, ok: bool, fallback_url: Option<String>) -> Result<Option<String>> {
        self.transition_to(TabState::Loaded)?;

        let pending = self.pending_url.take();
        let pending_proxied = self.pending_proxied.take();
        if !ok {
            tracing::debug!(tab_id = %self.id, url = %self.url, "Load failed, keeping last good URL");
            return Ok(None);
        }

        if let Some(url) = pending.or(fallback_url) {
            self.url = url;
        }
        if let Some(proxied) = pending_proxied {
            self.proxied = proxied;
        }

        Ok((!self.url.is_empty()).then(|| self.url.clone()))
    }

    pub fn close(&mut self) -> Result<()> {
        self.pending_url = None;
        self.pending_proxied = None;
        self.transition_to(TabState::Closed)
    }

    /// The URL the address bar should show: the pending load, else the last good one
    pub fn effective_url(&self) -> &str {
        self.pending_url.as_deref().unwrap_or(&self.url)
    }

    /// Whether the page shown or being loaded needs the onion proxy
    pub fn needs_proxy(&self) -> bool {
        self.pending_proxied.unwrap_or(self.proxied)
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Get display title (with fallback to label, then URL)
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            &self.title
        } else if !self.label.is_empty() {
            &self.label
        } else {
            self.effective_url()
        }
    }
}
