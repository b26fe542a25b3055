//! Request routing policy
//!
//! Decides per destination whether to allow it, block it, or send it
//! through the onion proxy.

use std::sync::Arc;

use crate::filter::FilterList;
use crate::proxy::{ProxyConfigurator, ProxyPolicy, ProxyScope};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// Destination contains the given block rule
    Block { rule: String },
    ProxyRoute,
}

pub struct RoutingPolicy {
    filters: FilterList,
    proxy: ProxyPolicy,
    configurator: Arc<dyn ProxyConfigurator>,
}

impl RoutingPolicy {
    pub fn new(
        filters: FilterList,
        proxy: ProxyPolicy,
        configurator: Arc<dyn ProxyConfigurator>,
    ) -> Self {
        Self {
            filters,
            proxy,
            configurator,
        }
    }

    /// Classify a resolved destination. Blocking wins over proxy routing.
    pub fn classify(&self, destination: &str) -> RouteDecision {
        if let Some(rule) = self.filters.matching_rule(destination) {
            tracing::info!(url = %destination, rule = %rule, "Blocked ad request");
            return RouteDecision::Block {
                rule: rule.to_string(),
            };
        }

        if self.proxy.matches(destination) {
            return RouteDecision::ProxyRoute;
        }

        RouteDecision::Allow
    }

    /// Point the global proxy at the onion endpoint until the scope drops
    pub fn acquire_proxy(&self) -> ProxyScope {
        ProxyScope::acquire(
            Arc::clone(&self.configurator),
            self.proxy.endpoint().clone(),
        )
    }

    pub fn filters(&self) -> &FilterList {
        &self.filters
    }

    pub fn proxy_policy(&self) -> &ProxyPolicy {
        &self.proxy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyKind;
    use crate::testing::RecordingProxy;

    fn policy() -> (Arc<RecordingProxy>, RoutingPolicy) {
        let proxy = Arc::new(RecordingProxy::default());
        let policy = RoutingPolicy::new(FilterList::default(), ProxyPolicy::default(), proxy.clone());
        (proxy, policy)
    }

    #[test]
    fn test_classify() {
        let (_, policy) = policy();

        assert_eq!(
            policy.classify("https://ads.doubleclick.net/x"),
            RouteDecision::Block {
                rule: "doubleclick.net".to_string()
            }
        );
        assert_eq!(policy.classify("https://example.com"), RouteDecision::Allow);
        assert_eq!(policy.classify("example.onion"), RouteDecision::ProxyRoute);
    }

    #[test]
    fn test_block_takes_precedence_over_proxy() {
        let (_, policy) = policy();
        assert!(matches!(
            policy.classify("adnxs.com.onion"),
            RouteDecision::Block { .. }
        ));
    }

    #[test]
    fn test_classify_has_no_proxy_side_effect() {
        let (proxy, policy) = policy();
        policy.classify("example.onion");
        assert!(proxy.calls().is_empty());

        let scope = policy.acquire_proxy();
        assert_eq!(proxy.current().map(|(kind, _, _)| kind), Some(ProxyKind::Socks5));
        drop(scope);
        assert_eq!(proxy.current().map(|(kind, _, _)| kind), Some(ProxyKind::Direct));
    }
}
