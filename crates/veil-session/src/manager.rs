//! Session Manager
//!
//! Routes user actions to the active tab and renderer events to the tab
//! that owns the view. Keeps the onion proxy up exactly while the active
//! tab's page was routed to a `.onion` destination.

use std::sync::Arc;

use veil_navigation::{NavigationResolver, ResolvedAction};
use veil_privacy::ProxyScope;
use veil_tabs::{Renderer, RendererEvent, TabContext, TabState, ViewId};

use crate::error::SessionError;
use crate::event::SessionEvent;
use crate::session::Session;
use crate::Result;

/// Label of the tab opened at startup
pub const HOME_LABEL: &str = "Home";
/// Label of tabs opened with the new tab action
pub const NEW_TAB_LABEL: &str = "New Tab";

pub struct SessionManager {
    session: Session,
    renderer: Arc<dyn Renderer>,
    resolver: NavigationResolver,
    /// Held while the global proxy must point at the onion endpoint
    proxy_scope: Option<ProxyScope>,
    home_url: String,
}

impl SessionManager {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        resolver: NavigationResolver,
        home_url: String,
        incognito: bool,
    ) -> Self {
        Self {
            session: Session::new(incognito),
            renderer,
            resolver,
            proxy_scope: None,
            home_url,
        }
    }

    /// Open a tab, make it active and start loading `input` in it.
    ///
    /// Nothing is left behind if the load cannot start.
    pub fn open_tab(&mut self, input: &str, label: &str) -> Result<(usize, ResolvedAction)> {
        let action = self.resolver.resolve(input);

        let view = self.renderer.create_view();
        let mut tab = TabContext::new(view, label.to_string());
        if let Err(e) = begin_load(&mut tab, &action) {
            self.renderer.release(view);
            return Err(e);
        }

        tracing::info!(tab_id = %tab.id, view = %view, label = %label, "Opened tab");

        let index = self.session.push_tab(tab);
        self.issue_load(index, &action);

        Ok((index, action))
    }

    /// Open the home page in a new tab
    pub fn new_tab(&mut self) -> Result<(usize, ResolvedAction)> {
        let home = self.home_url.clone();
        self.open_tab(&home, NEW_TAB_LABEL)
    }

    pub fn close_tab(&mut self, index: usize) -> Result<()> {
        let mut tab = self.session.remove_tab(index)?;
        tab.close()?;
        self.renderer.release(tab.view);

        tracing::info!(
            tab_id = %tab.id,
            index,
            remaining = self.session.tab_count(),
            "Closed tab"
        );

        self.refresh_proxy();
        Ok(())
    }

    pub fn close_active_tab(&mut self) -> Result<()> {
        let index = self.require_active()?;
        self.close_tab(index)
    }

    pub fn focus_tab(&mut self, index: usize) -> Result<()> {
        self.session.set_active(index)?;
        tracing::debug!(index, "Focused tab");
        self.refresh_proxy();
        Ok(())
    }

    /// Resolve address bar input and load it in the active tab
    pub fn navigate_active(&mut self, input: &str) -> Result<ResolvedAction> {
        let index = self.require_active()?;
        self.navigate_tab(index, input)
    }

    pub fn home(&mut self) -> Result<ResolvedAction> {
        let home = self.home_url.clone();
        self.navigate_active(&home)
    }

    pub fn back(&mut self) -> Result<()> {
        let view = self.begin_history_load()?;
        self.renderer.back(view);
        Ok(())
    }

    pub fn forward(&mut self) -> Result<()> {
        let view = self.begin_history_load()?;
        self.renderer.forward(view);
        Ok(())
    }

    pub fn reload(&mut self) -> Result<()> {
        let view = self.begin_history_load()?;
        self.renderer.reload(view);
        Ok(())
    }

    /// Apply a renderer notification to the tab showing `view`.
    ///
    /// Events for views that no longer belong to a tab are dropped.
    pub fn handle_renderer_event(
        &mut self,
        view: ViewId,
        event: RendererEvent,
    ) -> Result<Option<SessionEvent>> {
        let Some(index) = self.session.position_of_view(view) else {
            tracing::debug!(view = %view, ?event, "Ignoring event for unknown view");
            return Ok(None);
        };

        let incognito = self.session.incognito;
        let fallback_url = match event {
            RendererEvent::LoadFinished(true) => self.renderer.current_url(view),
            _ => None,
        };
        let tab = self.session.tab_mut(index)?;

        let outcome = match event {
            RendererEvent::NavigationStarted => {
                if tab.state != TabState::Loading {
                    tab.transition_to(TabState::Loading)?;
                }
                None
            }
            RendererEvent::UrlChanged(url) => {
                tab.observe_url(url);
                None
            }
            RendererEvent::TitleChanged(title) => {
                tab.set_title(title);
                None
            }
            RendererEvent::LoadFinished(ok) => {
                let committed = tab.finish_load(ok, fallback_url)?;
                if !ok {
                    tracing::warn!(tab_id = %tab.id, url = %tab.url, "Page failed to load");
                }

                match committed {
                    Some(url) if !incognito => {
                        tracing::debug!(tab_id = %tab.id, url = %url, "Page loaded");
                        Some(SessionEvent::HistoryAppended(url))
                    }
                    _ => None,
                }
            }
        };

        if self.session.active_index() == Some(index) {
            self.refresh_proxy();
        }

        Ok(outcome)
    }

    /// Close every tab and drop the proxy. The session is empty afterwards.
    pub fn teardown(&mut self) {
        for mut tab in self.session.drain_tabs() {
            if let Err(e) = tab.close() {
                tracing::debug!(tab_id = %tab.id, error = %e, "Tab already closed");
            }
            self.renderer.release(tab.view);
        }
        self.proxy_scope = None;

        tracing::info!(session_id = %self.session.id, "Session torn down");
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tabs(&self) -> &[TabContext] {
        self.session.tabs()
    }

    pub fn active_tab(&self) -> Option<&TabContext> {
        self.session.active_tab()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.session.active_index()
    }

    pub fn tab_count(&self) -> usize {
        self.session.tab_count()
    }

    pub fn is_incognito(&self) -> bool {
        self.session.incognito
    }

    /// Whether the onion proxy is currently held
    pub fn is_proxied(&self) -> bool {
        self.proxy_scope.is_some()
    }

    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    pub fn resolver(&self) -> &NavigationResolver {
        &self.resolver
    }

    fn require_active(&self) -> Result<usize> {
        self.session.active_index().ok_or(SessionError::NoActiveTab)
    }

    fn navigate_tab(&mut self, index: usize, input: &str) -> Result<ResolvedAction> {
        let action = self.resolver.resolve(input);

        begin_load(self.session.tab_mut(index)?, &action)?;
        self.issue_load(index, &action);

        Ok(action)
    }

    /// Hand a navigation whose tab is already loading to the renderer,
    /// with the proxy up first when it was routed through it
    fn issue_load(&mut self, index: usize, action: &ResolvedAction) {
        match action {
            ResolvedAction::Blocked { url, rule } => {
                tracing::info!(url = %url, rule = %rule, "Navigation blocked");
            }
            ResolvedAction::Navigate { url, via_proxy } => {
                if *via_proxy {
                    self.acquire_proxy();
                }

                if let Some(tab) = self.session.tab(index) {
                    self.renderer.navigate(tab.view, url);
                    tracing::debug!(tab_id = %tab.id, url = %url, via_proxy, "Navigating");
                }
            }
        }

        self.refresh_proxy();
    }

    fn begin_history_load(&mut self) -> Result<ViewId> {
        let index = self.require_active()?;
        let tab = self.session.tab_mut(index)?;
        tab.begin_history_load()?;
        Ok(tab.view)
    }

    fn acquire_proxy(&mut self) {
        if self.proxy_scope.is_none() {
            self.proxy_scope = Some(self.resolver.policy().acquire_proxy());
        }
    }

    /// Hold the proxy while the active tab's page was routed through it,
    /// release it otherwise
    fn refresh_proxy(&mut self) {
        let needs_proxy = self
            .session
            .active_tab()
            .map(TabContext::needs_proxy)
            .unwrap_or(false);

        if needs_proxy {
            self.acquire_proxy();
        } else if self.proxy_scope.take().is_some() {
            tracing::debug!("Active tab no longer proxied");
        }
    }
}

/// Put `tab` into the loading state for `action`; blocked navigations leave it untouched
fn begin_load(tab: &mut TabContext, action: &ResolvedAction) -> Result<()> {
    if let ResolvedAction::Navigate { url, via_proxy } = action {
        tab.begin_navigation(url.clone(), *via_proxy)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_privacy::testing::RecordingProxy;
    use veil_privacy::{FilterList, ProxyKind, ProxyPolicy, RoutingPolicy};
    use veil_tabs::testing::{RecordingRenderer, RendererCall};

    const HOME: &str = "https://duckduckgo.com";

    struct Fixture {
        renderer: Arc<RecordingRenderer>,
        proxy: Arc<RecordingProxy>,
        manager: SessionManager,
    }

    fn fixture_with(incognito: bool) -> Fixture {
        fixture_with_search(incognito, "https://duckduckgo.com/?q=%s")
    }

    fn fixture_with_search(incognito: bool, template: &str) -> Fixture {
        let renderer = Arc::new(RecordingRenderer::default());
        let proxy = Arc::new(RecordingProxy::default());
        let policy = RoutingPolicy::new(FilterList::default(), ProxyPolicy::default(), proxy.clone());
        let resolver =
            NavigationResolver::with_search_engine(template.to_string(), Arc::new(policy)).unwrap();
        let manager = SessionManager::new(renderer.clone(), resolver, HOME.to_string(), incognito);

        Fixture {
            renderer,
            proxy,
            manager,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(false)
    }

    fn finish(manager: &mut SessionManager, ok: bool) -> Option<SessionEvent> {
        let view = manager.active_tab().unwrap().view;
        manager
            .handle_renderer_event(view, RendererEvent::LoadFinished(ok))
            .unwrap()
    }

    #[test]
    fn test_open_tab_navigates() {
        let mut f = fixture();
        let (index, action) = f.manager.open_tab(HOME, HOME_LABEL).unwrap();

        assert_eq!(index, 0);
        assert!(!action.is_blocked());
        let tab = f.manager.active_tab().unwrap();
        assert_eq!(tab.state, TabState::Loading);
        assert_eq!(tab.effective_url(), HOME);
        assert_eq!(f.renderer.navigations(), vec![(tab.view, HOME.to_string())]);
    }

    #[test]
    fn test_new_tab_opens_home() {
        let mut f = fixture();
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();
        let (index, _) = f.manager.new_tab().unwrap();

        assert_eq!(index, 1);
        assert_eq!(f.manager.active_index(), Some(1));
        assert_eq!(f.manager.active_tab().unwrap().label, NEW_TAB_LABEL);
        assert_eq!(f.manager.active_tab().unwrap().effective_url(), HOME);
    }

    #[test]
    fn test_search_load_emits_history() {
        let mut f = fixture();
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();
        finish(&mut f.manager, true);

        let action = f.manager.navigate_active("openai.com").unwrap();
        assert_eq!(action.url(), "https://duckduckgo.com/?q=openai.com");

        let event = finish(&mut f.manager, true);
        assert_eq!(
            event,
            Some(SessionEvent::HistoryAppended(
                "https://duckduckgo.com/?q=openai.com".to_string()
            ))
        );
        assert_eq!(f.manager.active_tab().unwrap().url, "https://duckduckgo.com/?q=openai.com");
    }

    #[test]
    fn test_incognito_records_nothing() {
        let mut f = fixture_with(true);
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();
        assert!(f.manager.is_incognito());
        assert_eq!(finish(&mut f.manager, true), None);
        assert_eq!(f.manager.active_tab().unwrap().url, HOME);
    }

    #[test]
    fn test_blocked_navigation_leaves_tab_untouched() {
        let mut f = fixture();
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();
        finish(&mut f.manager, true);
        let calls_before = f.renderer.calls().len();

        let action = f.manager.navigate_active("https://ads.doubleclick.net/x").unwrap();

        assert!(action.is_blocked());
        let tab = f.manager.active_tab().unwrap();
        assert_eq!(tab.state, TabState::Loaded);
        assert_eq!(tab.url, HOME);
        assert!(tab.pending_url.is_none());
        assert_eq!(f.renderer.calls().len(), calls_before);
    }

    #[test]
    fn test_failed_load_keeps_last_good_url() {
        let mut f = fixture();
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();
        finish(&mut f.manager, true);

        f.manager.navigate_active("https://unreachable.example").unwrap();
        assert_eq!(finish(&mut f.manager, false), None);

        let tab = f.manager.active_tab().unwrap();
        assert_eq!(tab.state, TabState::Loaded);
        assert_eq!(tab.url, HOME);
    }

    #[test]
    fn test_renderer_events_update_tab() {
        let mut f = fixture();
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();
        let view = f.manager.active_tab().unwrap().view;

        f.manager
            .handle_renderer_event(view, RendererEvent::UrlChanged("https://duckduckgo.com/".to_string()))
            .unwrap();
        f.manager
            .handle_renderer_event(view, RendererEvent::TitleChanged("DuckDuckGo".to_string()))
            .unwrap();
        let event = finish(&mut f.manager, true);

        assert_eq!(
            event,
            Some(SessionEvent::HistoryAppended("https://duckduckgo.com/".to_string()))
        );
        assert_eq!(f.manager.active_tab().unwrap().display_title(), "DuckDuckGo");

        // Link clicked inside the page
        f.manager
            .handle_renderer_event(view, RendererEvent::NavigationStarted)
            .unwrap();
        assert!(f.manager.active_tab().unwrap().is_loading());
    }

    #[test]
    fn test_back_uses_renderer_url() {
        let mut f = fixture();
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();
        finish(&mut f.manager, true);
        f.manager.navigate_active("https://example.com").unwrap();
        finish(&mut f.manager, true);

        let view = f.manager.active_tab().unwrap().view;
        f.manager.back().unwrap();
        assert!(f.renderer.calls().contains(&RendererCall::Back(view)));
        assert!(f.manager.active_tab().unwrap().is_loading());

        f.renderer.set_current_url(view, HOME);
        let event = finish(&mut f.manager, true);
        assert_eq!(event, Some(SessionEvent::HistoryAppended(HOME.to_string())));
    }

    #[test]
    fn test_events_for_closed_tabs_are_ignored() {
        let mut f = fixture();
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();
        f.manager.new_tab().unwrap();
        let closed_view = f.manager.active_tab().unwrap().view;
        f.manager.close_active_tab().unwrap();

        assert_eq!(f.renderer.released(), vec![closed_view]);
        let event = f
            .manager
            .handle_renderer_event(closed_view, RendererEvent::LoadFinished(true))
            .unwrap();
        assert_eq!(event, None);
    }

    #[test]
    fn test_close_last_tab_rejected() {
        let mut f = fixture();
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();

        assert!(matches!(f.manager.close_tab(0), Err(SessionError::LastTab)));
        assert!(matches!(
            f.manager.close_tab(3),
            Err(SessionError::InvalidTabIndex { index: 3, count: 1 })
        ));
        assert_eq!(f.manager.tab_count(), 1);
    }

    #[test]
    fn test_empty_session_errors() {
        let mut f = fixture();
        assert!(matches!(f.manager.navigate_active("x"), Err(SessionError::NoActiveTab)));
        assert!(matches!(f.manager.reload(), Err(SessionError::NoActiveTab)));
        assert!(matches!(f.manager.close_active_tab(), Err(SessionError::NoActiveTab)));
    }

    #[test]
    fn test_onion_navigation_holds_proxy() {
        let mut f = fixture();
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();
        assert!(f.proxy.calls().is_empty());

        let action = f.manager.navigate_active("example.onion").unwrap();
        assert_eq!(
            action,
            ResolvedAction::Navigate {
                url: "example.onion".to_string(),
                via_proxy: true
            }
        );
        assert!(f.manager.is_proxied());
        assert!(f.proxy.is_proxied());

        // Renderer normalises the address, still an onion host
        let view = f.manager.active_tab().unwrap().view;
        f.manager
            .handle_renderer_event(view, RendererEvent::UrlChanged("http://example.onion/".to_string()))
            .unwrap();
        finish(&mut f.manager, true);
        assert!(f.proxy.is_proxied());

        f.manager.navigate_active("https://example.com").unwrap();
        assert!(!f.manager.is_proxied());
        assert_eq!(f.proxy.current(), Some((ProxyKind::Direct, String::new(), 0)));
    }

    #[test]
    fn test_proxy_matches_routing_decision() {
        let mut f = fixture();
        f.manager.open_tab(HOME, HOME_LABEL).unwrap();

        // Raw suffix match: the path ends in .onion, so the load is proxied
        let action = f.manager.navigate_active("http://example.com/page.onion").unwrap();
        assert_eq!(
            action,
            ResolvedAction::Navigate {
                url: "http://example.com/page.onion".to_string(),
                via_proxy: true
            }
        );
        assert!(f.manager.is_proxied());
        assert_eq!(
            f.proxy.calls(),
            vec![(ProxyKind::Socks5, "127.0.0.1".to_string(), 9050)]
        );

        // The trailing slash defeats the suffix match, so it goes direct
        let action = f.manager.navigate_active("http://example.onion/").unwrap();
        assert_eq!(
            action,
            ResolvedAction::Navigate {
                url: "http://example.onion/".to_string(),
                via_proxy: false
            }
        );
        assert!(!f.manager.is_proxied());
        assert!(!f.proxy.is_proxied());
    }

    #[test]
    fn test_failed_load_falls_back_to_proxied_page() {
        let mut f = fixture();
        f.manager.open_tab("example.onion", HOME_LABEL).unwrap();
        finish(&mut f.manager, true);

        f.manager.navigate_active("https://example.com").unwrap();
        assert!(!f.proxy.is_proxied());

        finish(&mut f.manager, false);
        assert_eq!(f.manager.active_tab().unwrap().url, "example.onion");
        assert!(f.proxy.is_proxied());
    }

    #[test]
    fn test_open_tab_that_cannot_load_is_discarded() {
        // A bare "%s" template turns empty input into an empty URL
        let mut f = fixture_with_search(false, "%s");

        assert!(matches!(
            f.manager.open_tab("  ", HOME_LABEL),
            Err(SessionError::Tab(_))
        ));
        assert_eq!(f.manager.tab_count(), 0);
        assert!(f.manager.active_tab().is_none());
        assert_eq!(f.renderer.released().len(), 1);
        assert!(f.renderer.navigations().is_empty());
        assert!(f.proxy.calls().is_empty());

        f.manager.open_tab(HOME, HOME_LABEL).unwrap();
        finish(&mut f.manager, true);
        assert!(f.manager.navigate_active("").is_err());
        let tab = f.manager.active_tab().unwrap();
        assert_eq!(tab.state, TabState::Loaded);
        assert_eq!(tab.url, HOME);
        assert_eq!(f.manager.tab_count(), 1);
    }

    #[test]
    fn test_proxy_follows_focus() {
        let mut f = fixture();
        f.manager.open_tab("example.onion", HOME_LABEL).unwrap();
        f.manager.new_tab().unwrap();
        assert!(!f.proxy.is_proxied());

        f.manager.focus_tab(0).unwrap();
        assert!(f.proxy.is_proxied());

        f.manager.close_tab(0).unwrap();
        assert!(!f.proxy.is_proxied());
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut f = fixture();
        f.manager.open_tab("example.onion", HOME_LABEL).unwrap();
        f.manager.new_tab().unwrap();
        f.manager.focus_tab(0).unwrap();

        f.manager.teardown();

        assert_eq!(f.manager.tab_count(), 0);
        assert_eq!(f.renderer.released().len(), 2);
        assert!(!f.proxy.is_proxied());
    }
}
