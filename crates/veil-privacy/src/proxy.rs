//! Onion proxy routing
//!
//! The host application exposes one process-wide proxy setting. A
//! [`ProxyScope`] switches it to the SOCKS5 endpoint when created and back
//! to a direct connection when dropped.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const ONION_SUFFIX: &str = ".onion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    /// No proxy
    Direct,
    Socks5,
}

/// Process-wide proxy setter provided by the host networking layer
pub trait ProxyConfigurator: Send + Sync {
    fn set_global_proxy(&self, kind: ProxyKind, host: &str, port: u16);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
}

impl Default for ProxyEndpoint {
    /// Local Tor daemon
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9050,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyPolicy {
    suffix: String,
    endpoint: ProxyEndpoint,
}

impl ProxyPolicy {
    pub fn onion(endpoint: ProxyEndpoint) -> Self {
        Self {
            suffix: ONION_SUFFIX.to_string(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &ProxyEndpoint {
        &self.endpoint
    }

    /// Raw suffix match on the whole destination string
    pub fn matches(&self, destination: &str) -> bool {
        destination.ends_with(&self.suffix)
    }
}

impl Default for ProxyPolicy {
    fn default() -> Self {
        Self::onion(ProxyEndpoint::default())
    }
}

/// Holds the global proxy on the SOCKS5 endpoint for its lifetime
pub struct ProxyScope {
    configurator: Arc<dyn ProxyConfigurator>,
    endpoint: ProxyEndpoint,
}

impl ProxyScope {
    pub fn acquire(configurator: Arc<dyn ProxyConfigurator>, endpoint: ProxyEndpoint) -> Self {
        configurator.set_global_proxy(ProxyKind::Socks5, &endpoint.host, endpoint.port);

        tracing::info!(host = %endpoint.host, port = endpoint.port, "Routing through onion proxy");

        Self {
            configurator,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &ProxyEndpoint {
        &self.endpoint
    }
}

impl Drop for ProxyScope {
    fn drop(&mut self) {
        self.configurator.set_global_proxy(ProxyKind::Direct, "", 0);
        tracing::info!("Released onion proxy, connecting directly");
    }
}

impl std::fmt::Debug for ProxyScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyScope")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingProxy;

    #[test]
    fn test_suffix_match_is_raw() {
        let policy = ProxyPolicy::default();
        assert!(policy.matches("example.onion"));
        assert!(policy.matches("http://example.onion"));
        // Suffix only, a trailing slash or path defeats it
        assert!(!policy.matches("http://example.onion/"));
        assert!(policy.matches("http://example.com/page.onion"));
        assert!(!policy.matches("https://onion.example.com"));
    }

    #[test]
    fn test_scope_sets_and_reverts_proxy() {
        let proxy = Arc::new(RecordingProxy::default());

        {
            let scope = ProxyScope::acquire(proxy.clone(), ProxyEndpoint::default());
            assert_eq!(scope.endpoint().port, 9050);
            assert_eq!(
                proxy.current(),
                Some((ProxyKind::Socks5, "127.0.0.1".to_string(), 9050))
            );
        }

        assert_eq!(proxy.current(), Some((ProxyKind::Direct, String::new(), 0)));
        assert_eq!(proxy.calls().len(), 2);
    }
}
