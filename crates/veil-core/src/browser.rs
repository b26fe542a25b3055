//! Main browser state container

use parking_lot::RwLock;
use std::sync::Arc;

use veil_download::{DestinationChooser, Download, DownloadManager, DownloadOffer};
use veil_navigation::{NavigationResolver, ResolvedAction};
use veil_privacy::{FilterList, ProxyConfigurator, ProxyPolicy, RoutingPolicy};
use veil_session::{SessionEvent, SessionManager, HOME_LABEL};
use veil_storage::{AddBookmark, Bookmark, HistoryEntry, Store, UpdateBookmark};
use veil_tabs::{Renderer, RendererEvent, TabContext, ViewId};

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

/// Main browser instance
///
/// Owns the tab session and the persistent store, and moves session events
/// into the store. The renderer and the global proxy setting belong to the
/// host and are reached through their traits.
pub struct Browser {
    /// Configuration
    config: Config,
    /// Bookmarks and history
    store: Store,
    /// Open tabs and the active one
    session: Arc<RwLock<SessionManager>>,
    /// Download decisions
    download_manager: DownloadManager,
    /// Problems found at startup that the user should be told about
    notices: Arc<RwLock<Vec<String>>>,
}

impl Browser {
    /// Restore the store and open the home tab
    pub fn new(
        config: Config,
        renderer: Arc<dyn Renderer>,
        proxy: Arc<dyn ProxyConfigurator>,
    ) -> Result<Self> {
        let store = Store::new(config.bookmarks_path(), config.history_path());
        let notices: Vec<String> = store
            .restore()
            .into_iter()
            .map(|problem| problem.to_string())
            .collect();

        let mut filters = FilterList::new(config.blocked_domains.iter().cloned());
        filters.set_enabled(config.ad_blocking);

        let policy = RoutingPolicy::new(
            filters,
            ProxyPolicy::onion(config.onion_proxy.clone()),
            proxy,
        );
        let resolver =
            NavigationResolver::with_search_engine(config.search_engine.clone(), Arc::new(policy))?;

        let mut session =
            SessionManager::new(renderer, resolver, config.homepage.clone(), config.incognito);
        session.open_tab(&config.homepage, HOME_LABEL)?;

        let download_manager = DownloadManager::new(config.download_dir.clone());

        tracing::info!(
            data_dir = %config.data_dir.display(),
            incognito = config.incognito,
            ad_blocking = config.ad_blocking,
            notices = notices.len(),
            "Browser initialized"
        );

        Ok(Self {
            config,
            store,
            session: Arc::new(RwLock::new(session)),
            download_manager,
            notices: Arc::new(RwLock::new(notices)),
        })
    }

    // === Tab operations ===

    pub fn open_tab(&self, input: &str, label: &str) -> Result<(usize, ResolvedAction)> {
        let result = self.session.write().open_tab(input, label);
        rejected_as_warning("open_tab", result)
    }

    pub fn new_tab(&self) -> Result<(usize, ResolvedAction)> {
        let result = self.session.write().new_tab();
        rejected_as_warning("new_tab", result)
    }

    pub fn close_tab(&self, index: usize) -> Result<()> {
        let result = self.session.write().close_tab(index);
        rejected_as_warning("close_tab", result)
    }

    pub fn close_active_tab(&self) -> Result<()> {
        let result = self.session.write().close_active_tab();
        rejected_as_warning("close_active_tab", result)
    }

    pub fn focus_tab(&self, index: usize) -> Result<()> {
        let result = self.session.write().focus_tab(index);
        rejected_as_warning("focus_tab", result)
    }

    pub fn active_tab(&self) -> Option<TabContext> {
        self.session.read().active_tab().cloned()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.session.read().active_index()
    }

    pub fn tabs(&self) -> Vec<TabContext> {
        self.session.read().tabs().to_vec()
    }

    pub fn tab_count(&self) -> usize {
        self.session.read().tab_count()
    }

    // === Navigation ===

    /// Load address bar input in the active tab
    pub fn navigate(&self, input: &str) -> Result<ResolvedAction> {
        let result = self.session.write().navigate_active(input);
        rejected_as_warning("navigate", result)
    }

    pub fn back(&self) -> Result<()> {
        let result = self.session.write().back();
        rejected_as_warning("back", result)
    }

    pub fn forward(&self) -> Result<()> {
        let result = self.session.write().forward();
        rejected_as_warning("forward", result)
    }

    pub fn reload(&self) -> Result<()> {
        let result = self.session.write().reload();
        rejected_as_warning("reload", result)
    }

    pub fn home(&self) -> Result<ResolvedAction> {
        let result = self.session.write().home();
        rejected_as_warning("home", result)
    }

    /// Feed a renderer notification in, recording finished loads in history
    pub fn handle_renderer_event(&self, view: ViewId, event: RendererEvent) -> Result<()> {
        let outcome = self.session.write().handle_renderer_event(view, event)?;

        if let Some(SessionEvent::HistoryAppended(url)) = outcome {
            self.store.append_history(&url)?;
        }

        Ok(())
    }

    pub fn is_proxied(&self) -> bool {
        self.session.read().is_proxied()
    }

    // === Bookmarks ===

    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.store.bookmarks()
    }

    /// Bookmark the page in the active tab. The title defaults to its URL.
    pub fn bookmark_active_tab(&self, title: Option<&str>) -> Result<AddBookmark> {
        let url = {
            let session = self.session.read();
            let tab = session
                .active_tab()
                .ok_or(veil_session::SessionError::NoActiveTab)?;
            if tab.url.is_empty() {
                tab.effective_url().to_string()
            } else {
                tab.url.clone()
            }
        };

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&url);

        Ok(self.store.add_bookmark(title, &url)?)
    }

    pub fn add_bookmark(&self, title: &str, url: &str) -> Result<AddBookmark> {
        Ok(self.store.add_bookmark(title, url)?)
    }

    pub fn update_bookmark(&self, index: usize, title: &str, url: &str) -> Result<UpdateBookmark> {
        Ok(self.store.update_bookmark(index, title, url)?)
    }

    pub fn remove_bookmark(&self, index: usize) -> Result<Bookmark> {
        Ok(self.store.remove_bookmark(index)?)
    }

    /// Load a bookmark in the active tab
    pub fn open_bookmark(&self, index: usize) -> Result<ResolvedAction> {
        let url = self
            .store
            .bookmarks()
            .get(index)
            .map(|b| b.url.clone())
            .ok_or(veil_storage::StorageError::BookmarkNotFound(index))?;

        self.navigate(&url)
    }

    // === History ===

    /// Visited URLs, oldest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.store.history()
    }

    /// Visited URLs, newest first
    pub fn recent_history(&self) -> Vec<HistoryEntry> {
        let mut history = self.store.history();
        history.reverse();
        history
    }

    pub fn clear_history(&self) -> Result<()> {
        Ok(self.store.clear_history()?)
    }

    /// Load a history entry (oldest-first index) in the active tab
    pub fn open_history_entry(&self, index: usize) -> Result<ResolvedAction> {
        let url = self
            .store
            .history()
            .get(index)
            .map(|entry| entry.url.clone())
            .ok_or(CoreError::HistoryEntryNotFound(index))?;

        self.navigate(&url)
    }

    // === Download operations ===

    pub fn on_download_offer(
        &self,
        offer: DownloadOffer,
        chooser: &dyn DestinationChooser,
    ) -> Result<Download> {
        Ok(self.download_manager.handle_offer(offer, chooser)?)
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.download_manager.list_downloads()
    }

    // === Lifecycle ===

    /// Startup problems (e.g. an unreadable bookmark file), cleared once taken
    pub fn take_notices(&self) -> Vec<String> {
        std::mem::take(&mut *self.notices.write())
    }

    /// Close every tab and release the proxy
    pub fn shutdown(&self) {
        self.session.write().teardown();
        tracing::info!("Browser shut down");
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl Clone for Browser {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            store: self.store.clone(),
            session: Arc::clone(&self.session),
            download_manager: self.download_manager.clone(),
            notices: Arc::clone(&self.notices),
        }
    }
}

/// Session rejections are expected user-level outcomes; log them and pass them on
fn rejected_as_warning<T>(operation: &str, result: veil_session::Result<T>) -> Result<T> {
    result.map_err(|e| {
        tracing::warn!(operation, error = %e, "Session rejected operation");
        CoreError::from(e)
    })
}
