//! Test doubles

use parking_lot::Mutex;

use crate::proxy::{ProxyConfigurator, ProxyKind};

/// Records every global proxy change
#[derive(Debug, Default)]
pub struct RecordingProxy {
    calls: Mutex<Vec<(ProxyKind, String, u16)>>,
}

impl RecordingProxy {
    pub fn calls(&self) -> Vec<(ProxyKind, String, u16)> {
        self.calls.lock().clone()
    }

    /// Most recent setting, `None` if never set
    pub fn current(&self) -> Option<(ProxyKind, String, u16)> {
        self.calls.lock().last().cloned()
    }

    pub fn is_proxied(&self) -> bool {
        matches!(self.current(), Some((ProxyKind::Socks5, _, _)))
    }
}

impl ProxyConfigurator for RecordingProxy {
    fn set_global_proxy(&self, kind: ProxyKind, host: &str, port: u16) {
        self.calls.lock().push((kind, host.to_string(), port));
    }
}
