//! Veil Tab Management
//!
//! A tab is one browsing context backed by a view of the external renderer.
//! The renderer does all loading and reports progress back as
//! [`RendererEvent`]s, which drive the tab's load state machine.

mod error;
mod renderer;
mod state;
mod tab;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::TabError;
pub use renderer::{Renderer, RendererEvent, ViewId};
pub use state::TabState;
pub use tab::TabContext;

pub type Result<T> = std::result::Result<T, TabError>;
