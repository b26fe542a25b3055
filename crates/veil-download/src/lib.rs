//! Veil Download Handling
//!
//! The renderer performs the transfer. This crate only decides where an
//! offered download goes:
//! - The suggested file name is reduced to a bare, safe name
//! - The user picks the destination through a [`DestinationChooser`]
//! - No destination chosen means the download is cancelled

mod download;
mod error;
mod manager;

pub use download::{Download, DownloadOffer, DownloadState};
pub use error::DownloadError;
pub use manager::{DestinationChooser, DownloadManager};

pub type Result<T> = std::result::Result<T, DownloadError>;
