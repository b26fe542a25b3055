//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Tab index {index} out of range ({count} tabs open)")]
    InvalidTabIndex { index: usize, count: usize },

    #[error("No active tab")]
    NoActiveTab,

    #[error("Cannot close the last tab")]
    LastTab,

    #[error("Tab error: {0}")]
    Tab(#[from] veil_tabs::TabError),
}
