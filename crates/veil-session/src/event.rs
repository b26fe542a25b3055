//! Session notifications

use serde::Serialize;

/// Raised while handling renderer events, consumed by the owner of the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "url", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A page finished loading in a non-incognito session
    HistoryAppended(String),
}
