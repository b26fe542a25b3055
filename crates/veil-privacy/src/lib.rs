//! Veil Privacy Protection
//!
//! - Blocks destinations containing a known advertising host
//! - Routes `.onion` destinations through a local SOCKS5 (Tor) proxy
//!
//! The proxy is a process-wide setting owned by the host; this crate only
//! decides when it must be on and holds it there through a [`ProxyScope`].

mod filter;
mod proxy;
mod routing;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use filter::{FilterList, DEFAULT_BLOCKED_DOMAINS};
pub use proxy::{
    ProxyConfigurator, ProxyEndpoint, ProxyKind, ProxyPolicy, ProxyScope, ONION_SUFFIX,
};
pub use routing::{RouteDecision, RoutingPolicy};
