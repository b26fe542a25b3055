//! Veil Session Management
//!
//! - A session is the ordered set of open tabs plus the active one
//! - While the window is open the session always holds at least one tab
//! - Address bar input goes to the active tab through the navigation resolver
//! - Renderer events drive tab state; finished loads are reported as
//!   [`SessionEvent::HistoryAppended`] for the caller to persist

mod error;
mod event;
mod manager;
mod session;

pub use error::SessionError;
pub use event::SessionEvent;
pub use manager::{SessionManager, HOME_LABEL, NEW_TAB_LABEL};
pub use session::Session;

pub type Result<T> = std::result::Result<T, SessionError>;
