//! Input resolution for the address bar

use std::sync::Arc;
use url::form_urlencoded;

use veil_privacy::{RouteDecision, RoutingPolicy, ONION_SUFFIX};

use crate::error::NavigationError;
use crate::Result;

pub const DEFAULT_SEARCH_ENGINE: &str = "https://duckduckgo.com/?q=%s";

/// Result of resolving address bar input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAction {
    /// Load `url`, through the onion proxy when `via_proxy` is set
    Navigate { url: String, via_proxy: bool },
    /// The destination matched a block rule and must not be loaded
    Blocked { url: String, rule: String },
}

impl ResolvedAction {
    pub fn url(&self) -> &str {
        match self {
            ResolvedAction::Navigate { url, .. } | ResolvedAction::Blocked { url, .. } => url,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, ResolvedAction::Blocked { .. })
    }
}

pub struct NavigationResolver {
    /// Search engine URL template (%s replaced with query)
    search_template: String,
    policy: Arc<RoutingPolicy>,
}

impl NavigationResolver {
    pub fn new(policy: Arc<RoutingPolicy>) -> Self {
        Self {
            search_template: DEFAULT_SEARCH_ENGINE.to_string(),
            policy,
        }
    }

    pub fn with_search_engine(template: String, policy: Arc<RoutingPolicy>) -> Result<Self> {
        let mut resolver = Self::new(policy);
        resolver.set_search_engine(template)?;
        Ok(resolver)
    }

    pub fn set_search_engine(&mut self, template: String) -> Result<()> {
        if !template.contains("%s") {
            return Err(NavigationError::InvalidSearchTemplate(template));
        }
        self.search_template = template;
        Ok(())
    }

    pub fn search_template(&self) -> &str {
        &self.search_template
    }

    pub fn policy(&self) -> &Arc<RoutingPolicy> {
        &self.policy
    }

    /// Resolve user input into a destination, then filter it
    pub fn resolve(&self, input: &str) -> ResolvedAction {
        let input = input.trim();
        let (url, via_proxy) = self.destination_for(input);

        let action = match self.policy.classify(&url) {
            RouteDecision::Block { rule } => ResolvedAction::Blocked { url, rule },
            RouteDecision::ProxyRoute => ResolvedAction::Navigate {
                url,
                via_proxy: true,
            },
            RouteDecision::Allow => ResolvedAction::Navigate { url, via_proxy },
        };

        tracing::debug!(input = %input, action = ?action, "Resolved input");

        action
    }

    fn destination_for(&self, input: &str) -> (String, bool) {
        if input.ends_with(ONION_SUFFIX) {
            return (input.to_string(), true);
        }

        if input.starts_with("http://") || input.starts_with("https://") {
            return (input.to_string(), false);
        }

        (self.search_url(input), false)
    }

    /// Build search URL from query
    pub fn search_url(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.search_template.replace("%s", &encoded)
    }
}
