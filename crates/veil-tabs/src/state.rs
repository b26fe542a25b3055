//! Tab State Machine
//!
//! ```text
//! Created
//!   ↓ navigate
//! Loading ⇄ Loaded
//!   ↓ close
//! Closed
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabState {
    /// View exists, nothing requested yet
    Created,
    /// A load is in flight in the renderer
    Loading,
    /// Last load finished, successfully or not
    Loaded,
    /// Removed from the session
    Closed,
}

impl TabState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: TabState) -> bool {
        match (self, target) {
            (TabState::Created, TabState::Loading) => true,
            (TabState::Loading, TabState::Loaded) => true,
            (TabState::Loaded, TabState::Loading) => true,
            // Closing abandons whatever is in flight
            (TabState::Created | TabState::Loading | TabState::Loaded, TabState::Closed) => true,
            (TabState::Closed, _) => false,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, TabState::Loading)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabState::Created => "created",
            TabState::Loading => "loading",
            TabState::Loaded => "loaded",
            TabState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TabState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
