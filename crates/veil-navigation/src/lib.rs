//! Veil Navigation
//!
//! Address bar input resolution, first match wins:
//! 1. `*.onion` → navigate through the onion proxy
//! 2. `http://` / `https://` → navigate as typed
//! 3. anything else → search engine query
//!
//! The resolved destination is then checked against the routing policy.

mod error;
mod resolver;

pub use error::NavigationError;
pub use resolver::{NavigationResolver, ResolvedAction, DEFAULT_SEARCH_ENGINE};

pub type Result<T> = std::result::Result<T, NavigationError>;
